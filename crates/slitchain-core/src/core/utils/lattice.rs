use nalgebra::Point3;

/// Rounds `x` up to the next power of two. Negative input and zero yield `0`.
pub fn pow2_round_up(x: i64) -> i64 {
    if x <= 0 {
        return 0;
    }
    let mut v = x - 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v |= v >> 32;
    v + 1
}

/// The eight lattice sites covered by a unit whose lower corner is `position`.
pub fn cube_sites(position: &Point3<i32>) -> impl Iterator<Item = [i32; 3]> + '_ {
    (0..8).map(move |corner: i32| {
        [
            position.x + (corner & 1),
            position.y + ((corner >> 1) & 1),
            position.z + ((corner >> 2) & 1),
        ]
    })
}
