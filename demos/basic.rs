use nalgebra as na;
use rand::Rng;

use quickhull3d::ConvexHull;

fn main() {
    let mut rng = rand::thread_rng();
    let size = 1000.0;
    let points: Vec<_> = (0..5_000)
        .map(|_| {
            na::Point3::new(
                rng.gen_range(-size, size),
                rng.gen_range(-size, size),
                rng.gen_range(-size, size),
            )
        })
        .collect();

    match ConvexHull::quickhull(&points) {
        Ok(hull) => {
            println!(
                "{} faces over {} of {} points, volume {:.1}",
                hull.num_faces(),
                hull.num_vertices(),
                points.len(),
                hull.volume()
            );
            let largest = hull.faces().iter().map(|f| f.len()).max().unwrap_or(0);
            println!("largest face has {} vertices", largest);
        }
        Err(err) => eprintln!("hull failed: {}", err),
    }
}
