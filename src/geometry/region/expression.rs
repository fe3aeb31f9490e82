//! Text form of region expressions.
//!
//! ```text
//! expr   := term ('|' term)*          union
//! term   := factor factor*            intersection (juxtaposition)
//! factor := '~' factor | '(' expr ')' | ['-' | '+'] id
//! ```
//!
//! `10000` is the positive half-space of surface 10000 and `-10000` the
//! negative one. Compound nodes are written in parentheses and a
//! complemented group is prefixed with `~`.

use std::fmt;

use crate::error::ExpressionError;
use crate::model::ids::SurfaceId;

use super::{algebra, Halfspace, Region, Sense};

/// Deepest nesting of `(` and `~` the parser accepts.
const MAX_DEPTH: usize = 256;

/// How the outermost group of an expression is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionStyle {
    /// Every intersection and union is parenthesized, the outermost one
    /// included: `(10000 -10001)`.
    #[default]
    Grouped,
    /// The outermost group is written without parentheses:
    /// `10000 -10001`.
    Bare,
}

impl Region {
    /// Renders the expression.
    #[must_use]
    pub fn to_expression(&self, style: RegionStyle) -> String {
        let mut out = String::new();
        write_region(&mut out, self, style == RegionStyle::Bare);
        out
    }

    /// Parses an expression written by [`to_expression`](Self::to_expression).
    ///
    /// The result is built through the combinators and is therefore
    /// canonical.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] with the byte offset of the first
    /// problem.
    pub fn from_expression(text: &str) -> Result<Region, ExpressionError> {
        let mut parser = Parser {
            text,
            pos: 0,
            depth: 0,
        };
        let region = parser.union()?;
        parser.skip_whitespace();
        if parser.pos < text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression(RegionStyle::Grouped))
    }
}

fn write_halfspace(out: &mut String, h: Halfspace) {
    if h.sense == Sense::Negative {
        out.push('-');
    }
    out.push_str(&h.surface.to_string());
}

fn write_group(out: &mut String, children: &[Region], separator: &str, bare: bool) {
    if !bare {
        out.push('(');
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_region(out, child, false);
    }
    if !bare {
        out.push(')');
    }
}

fn write_region(out: &mut String, region: &Region, bare: bool) {
    match region {
        Region::Leaf(h) => write_halfspace(out, *h),
        Region::Intersection(children) => write_group(out, children, " ", bare),
        Region::Union(children) => write_group(out, children, " | ", bare),
        Region::Complement(inner) => match &**inner {
            Region::Leaf(h) => write_halfspace(out, h.flipped()),
            compound => {
                out.push('~');
                write_region(out, compound, false);
            }
        },
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> ExpressionError {
        ExpressionError {
            offset: self.pos,
            message: message.to_owned(),
        }
    }

    fn descend(&mut self) -> Result<(), ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_raw() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek_raw(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.peek_raw()
    }

    fn union(&mut self) -> Result<Region, ExpressionError> {
        let mut region = self.intersection()?;
        while self.peek() == Some(b'|') {
            self.pos += 1;
            let rhs = self.intersection()?;
            region = algebra::union(region, rhs);
        }
        Ok(region)
    }

    fn intersection(&mut self) -> Result<Region, ExpressionError> {
        let mut region = self.factor()?;
        while matches!(self.peek(), Some(c) if starts_factor(c)) {
            let rhs = self.factor()?;
            region = algebra::intersect(region, rhs);
        }
        Ok(region)
    }

    fn factor(&mut self) -> Result<Region, ExpressionError> {
        match self.peek() {
            Some(b'~') => {
                self.descend()?;
                self.pos += 1;
                let inner = self.factor()?;
                self.depth -= 1;
                Ok(algebra::complement(inner))
            }
            Some(b'(') => {
                self.descend()?;
                self.pos += 1;
                let inner = self.union()?;
                if self.peek() != Some(b')') {
                    return Err(self.error("expected `)`"));
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(inner)
            }
            Some(c) if c == b'-' || c == b'+' || c.is_ascii_digit() => self.halfspace(),
            Some(_) => Err(self.error("expected a half-space, `(` or `~`")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn halfspace(&mut self) -> Result<Region, ExpressionError> {
        let sense = match self.peek_raw() {
            Some(b'-') => {
                self.pos += 1;
                Sense::Negative
            }
            Some(b'+') => {
                self.pos += 1;
                Sense::Positive
            }
            _ => Sense::Positive,
        };
        let start = self.pos;
        while matches!(self.peek_raw(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a surface id"));
        }
        let id: u32 = self.text[start..self.pos].parse().map_err(|_| ExpressionError {
            offset: start,
            message: "surface id out of range".to_owned(),
        })?;
        if id == 0 {
            return Err(ExpressionError {
                offset: start,
                message: "surface ids are positive".to_owned(),
            });
        }
        Ok(Region::half_space(SurfaceId(id), sense))
    }
}

fn starts_factor(c: u8) -> bool {
    c == b'~' || c == b'(' || c == b'-' || c == b'+' || c.is_ascii_digit()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::region::{complement, intersect, union};

    fn pos(id: u32) -> Region {
        Region::positive(SurfaceId(id))
    }

    fn neg(id: u32) -> Region {
        Region::negative(SurfaceId(id))
    }

    #[test]
    fn leaves_render_as_signed_ids() {
        assert_eq!(pos(10_000).to_string(), "10000");
        assert_eq!(neg(10_001).to_string(), "-10001");
    }

    #[test]
    fn intersection_grouped_and_bare() {
        let gap = intersect(pos(10_000), neg(10_001));
        assert_eq!(gap.to_string(), "(10000 -10001)");
        assert_eq!(gap.to_expression(RegionStyle::Bare), "10000 -10001");
    }

    #[test]
    fn associativity_renders_identically() {
        let left = intersect(intersect(pos(1), neg(2)), pos(3));
        let right = intersect(pos(1), intersect(neg(2), pos(3)));
        assert_eq!(left.to_string(), "(1 -2 3)");
        assert_eq!(left.to_string(), right.to_string());
    }

    #[test]
    fn union_uses_bar_separator() {
        let r = intersect(union(pos(1), neg(2)), pos(3));
        assert_eq!(r.to_string(), "((1 | -2) 3)");
        assert_eq!(r.to_expression(RegionStyle::Bare), "(1 | -2) 3");
    }

    #[test]
    fn complement_of_compound_is_marked() {
        let r = complement(union(pos(1), pos(2)));
        assert_eq!(r.to_string(), "~(1 | 2)");
        assert_eq!(r.to_expression(RegionStyle::Bare), "~(1 | 2)");
    }

    #[test]
    fn raw_complement_of_leaf_renders_flipped() {
        let r = Region::Complement(Box::new(pos(7)));
        assert_eq!(r.to_string(), "-7");
    }

    #[test]
    fn root_cell_box() {
        let r = [pos(1), neg(2), pos(3), neg(4), pos(5), neg(6)]
            .into_iter()
            .reduce(intersect)
            .unwrap();
        assert_eq!(r.to_string(), "(1 -2 3 -4 5 -6)");
    }

    #[test]
    fn round_trip_both_styles() {
        let trees = [
            neg(10_000),
            intersect(pos(10_000), neg(10_001)),
            union(intersect(pos(1), neg(2)), complement(union(pos(3), neg(4)))),
            intersect(
                complement(intersect(pos(5), pos(6))),
                union(neg(7), intersect(pos(8), neg(9))),
            ),
        ];
        for tree in trees {
            for style in [RegionStyle::Grouped, RegionStyle::Bare] {
                let text = tree.to_expression(style);
                let parsed = Region::from_expression(&text).unwrap();
                assert_eq!(parsed, tree, "{text}");
            }
        }
    }

    #[test]
    fn parse_precedence() {
        // complement binds tighter than intersection, which binds tighter than union
        let r = Region::from_expression("1 -2 | ~(3 4) 5").unwrap();
        let expected = union(
            intersect(pos(1), neg(2)),
            intersect(complement(intersect(pos(3), pos(4))), pos(5)),
        );
        assert_eq!(r, expected);
    }

    #[test]
    fn parse_complement_of_leaf_flips() {
        assert_eq!(Region::from_expression("~12").unwrap(), neg(12));
        assert_eq!(Region::from_expression("+12").unwrap(), pos(12));
    }

    #[test]
    fn parse_errors_report_offset() {
        let err = Region::from_expression("(1 2").unwrap_err();
        assert_eq!(err.offset, 4);
        let err = Region::from_expression("1 & 2").unwrap_err();
        assert_eq!(err.offset, 2);
        let err = Region::from_expression("-0").unwrap_err();
        assert_eq!(err.offset, 1);
        assert!(Region::from_expression("").is_err());
        assert!(Region::from_expression("1 |").is_err());
        assert!(Region::from_expression("99999999999").is_err());
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let parens = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = Region::from_expression(&parens).unwrap_err();
        assert_eq!(err.offset, MAX_DEPTH);
        assert_eq!(err.message, "expression nested too deeply");

        let tildes = format!("{}1", "~".repeat(200_000));
        let err = Region::from_expression(&tildes).unwrap_err();
        assert_eq!(err.offset, MAX_DEPTH);
    }

    #[test]
    fn nesting_up_to_limit_parses() {
        let text = format!("{}-1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(Region::from_expression(&text).unwrap(), neg(1));
        // depth is released when a group closes
        let siblings = format!("{text} 2");
        assert!(Region::from_expression(&siblings).is_ok());
    }
}
