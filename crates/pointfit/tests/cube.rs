use approx::assert_relative_eq;
use pointfit::fit::{fit_line, fit_plane, fit_sphere, FitError};
use pointfit::mls::{smooth_mls_2d, MlsParams};
use pointfit::p3d::{NeighborQuery, PointSet, PointsInput};

fn cube_corners() -> Vec<[f64; 3]> {
    let mut corners = Vec::with_capacity(8);
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                corners.push([x, y, z]);
            }
        }
    }
    corners
}

#[test]
fn cube_face_plane_normals() -> Result<(), Box<dyn std::error::Error>> {
    let cube = PointSet::from_points(cube_corners());
    let corners = cube.coordinates(true);

    for axis in 0..3 {
        for level in [0.0, 1.0] {
            let face: Vec<[f64; 3]> = corners
                .iter()
                .filter(|p| p[axis] == level)
                .copied()
                .collect();
            assert_eq!(face.len(), 4);

            let plane = fit_plane(&face)?;
            assert_relative_eq!(plane.min_variance, 0.0, epsilon = 1e-12);
            for k in 0..3 {
                let expected = if k == axis { 1.0 } else { 0.0 };
                assert_relative_eq!(plane.normal[k].abs(), expected, epsilon = 1e-9);
            }
        }
    }
    Ok(())
}

#[test]
fn cube_rotated_face_follows_pose() -> Result<(), Box<dyn std::error::Error>> {
    let mut cube = PointSet::from_points(cube_corners());
    cube.rotate_z(std::f64::consts::FRAC_PI_2);
    cube.translate([5.0, 0.0, 0.0]);

    // the x == 0 face of the raw cube is now the y == 0 face
    let face = cube.points_at(&[0, 1, 2, 3])?;
    let plane = fit_plane(&face)?;
    assert_relative_eq!(plane.normal[1].abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(plane.center[0], 4.5, epsilon = 1e-9);
    Ok(())
}

#[test]
fn cube_edges_and_sphere() -> Result<(), Box<dyn std::error::Error>> {
    let corners = cube_corners();

    let edge = fit_line(&[corners[0], corners[1]])?;
    assert_relative_eq!(edge.direction[2], 1.0, epsilon = 1e-9);
    assert_relative_eq!(edge.length(), 1.0, epsilon = 1e-9);

    let sphere = fit_sphere(&corners)?;
    for k in 0..3 {
        assert_relative_eq!(sphere.center[k], 0.5, epsilon = 1e-9);
    }
    assert_relative_eq!(sphere.radius, 3f64.sqrt() / 2.0, epsilon = 1e-9);

    let face: Vec<[f64; 3]> = corners.iter().filter(|p| p[2] == 0.0).copied().collect();
    assert!(matches!(
        fit_sphere(&face),
        Err(FitError::RankDeficient { .. })
    ));
    Ok(())
}

#[test]
fn smoothed_face_stays_on_plane() -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = Vec::new();
    for i in 0..11 {
        for j in 0..11 {
            rows.push(vec![i as f64 * 0.1, j as f64 * 0.1, 1.0]);
        }
    }
    let mut face = PointSet::new(PointsInput::Rows(rows))?;
    assert_eq!(face.closest_point(&[0.0, 0.0, 1.0], NeighborQuery::Closest), vec![0]);

    let result = smooth_mls_2d(&face, &MlsParams::default())?;
    assert_eq!(result.kept_indices.len(), face.len());
    result.apply_to(&mut face)?;

    for p in face.coordinates(true).iter() {
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-9);
    }
    let plane = fit_plane(&face.coordinates(true))?;
    assert_relative_eq!(plane.normal[2], 1.0, epsilon = 1e-9);
    Ok(())
}
