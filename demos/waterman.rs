//! Hulls of Waterman polyhedra: the points of the face-centred cubic lattice
//! (integer points with an even coordinate sum) within a radius of the
//! origin.

use std::env;

use quickhull3d::ConvexHull;

/// Flat coordinates of the lattice points with `x² + y² + z² <= radius`,
/// scaled so the largest coordinate is 1.
fn waterman_points(radius: f64) -> Vec<f64> {
    let mut coords = Vec::new();
    let s = radius.sqrt();
    let r = s.floor() as i64;
    for x in -r..=r {
        for y in -r..=r {
            for z in -r..=r {
                if (x + y + z).rem_euclid(2) != 0 {
                    continue;
                }
                if ((x * x + y * y + z * z) as f64) <= radius {
                    coords.extend_from_slice(&[x as f64, y as f64, z as f64]);
                }
            }
        }
    }

    let max = coords.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    if max != 0.0 {
        for c in &mut coords {
            *c /= max;
        }
    }
    coords
}

fn main() {
    let radii: Vec<f64> = env::args()
        .skip(1)
        .filter_map(|arg| arg.parse().ok())
        .collect();
    let radii = if radii.is_empty() {
        (2..=40).map(f64::from).collect()
    } else {
        radii
    };

    for radius in radii {
        let coords = waterman_points(radius);
        match ConvexHull::from_coords(&coords) {
            Ok(hull) => println!(
                "radius {:>4}: {:>6} points, {:>4} faces, {:>4} vertices",
                radius,
                coords.len() / 3,
                hull.num_faces(),
                hull.num_vertices()
            ),
            Err(err) => println!("radius {:>4}: {}", radius, err),
        }
    }
}
