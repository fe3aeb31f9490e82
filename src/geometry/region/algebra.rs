//! Region combinators.
//!
//! Complement policy: the complement of a half-space becomes the opposite
//! half-space and a double complement cancels, but the complement of an
//! intersection or union is kept as an explicit [`Region::Complement`] node.
//! [`push_complements`] rewrites a tree with De Morgan's laws when the
//! normal form is wanted.

use super::Region;

/// Intersection of `a` and `b`.
///
/// Operands that are already intersections are spliced in, so
/// `intersect(intersect(x, y), z)` is a single three-operand intersection.
#[must_use]
pub fn intersect(a: Region, b: Region) -> Region {
    let mut children = Vec::new();
    splice_intersection(&mut children, a);
    splice_intersection(&mut children, b);
    Region::Intersection(children)
}

/// Union of `a` and `b`, flattened like [`intersect`].
#[must_use]
pub fn union(a: Region, b: Region) -> Region {
    let mut children = Vec::new();
    splice_union(&mut children, a);
    splice_union(&mut children, b);
    Region::Union(children)
}

/// Complement of `a`.
#[must_use]
pub fn complement(a: Region) -> Region {
    match a {
        Region::Leaf(h) => Region::Leaf(h.flipped()),
        Region::Complement(inner) => *inner,
        compound => Region::Complement(Box::new(compound)),
    }
}

/// Intersection of every region in `regions`.
///
/// Returns `None` for no operands and the operand itself for one.
pub fn all_of(regions: impl IntoIterator<Item = Region>) -> Option<Region> {
    regions.into_iter().reduce(intersect)
}

/// Union of every region in `regions`.
///
/// Returns `None` for no operands and the operand itself for one.
pub fn any_of(regions: impl IntoIterator<Item = Region>) -> Option<Region> {
    regions.into_iter().reduce(union)
}

/// Rewrites `region` with De Morgan's laws until no complement node is
/// left; complements end up folded into the half-spaces.
#[must_use]
pub fn push_complements(region: Region) -> Region {
    push(region, false)
}

fn push(region: Region, negate: bool) -> Region {
    match region {
        Region::Leaf(h) => Region::Leaf(if negate { h.flipped() } else { h }),
        Region::Complement(inner) => push(*inner, !negate),
        Region::Intersection(children) => {
            let parts = children.into_iter().map(|c| push(c, negate));
            rebuild(parts, negate)
        }
        Region::Union(children) => {
            let parts = children.into_iter().map(|c| push(c, negate));
            rebuild(parts, !negate)
        }
    }
}

fn rebuild(parts: impl Iterator<Item = Region>, as_union: bool) -> Region {
    let combined = if as_union { any_of(parts) } else { all_of(parts) };
    combined.unwrap_or_else(|| {
        if as_union {
            Region::Union(Vec::new())
        } else {
            Region::Intersection(Vec::new())
        }
    })
}

fn splice_intersection(out: &mut Vec<Region>, region: Region) {
    match region {
        Region::Intersection(children) => out.extend(children),
        other => out.push(other),
    }
}

fn splice_union(out: &mut Vec<Region>, region: Region) {
    match region {
        Region::Union(children) => out.extend(children),
        other => out.push(other),
    }
}
