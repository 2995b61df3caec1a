use glam::Vec3;
use phys_pipeline::world::{collision_code, get_collision, ColliderObject, Contact, SceneObject};

fn cube_at(center: Vec3, half: Vec3) -> ColliderObject {
    let min = center - half;
    let max = center + half;
    // Corners plus an interior point, as a real mesh would have
    let vertices = [min.to_array(), center.to_array(), max.to_array()].concat();
    ColliderObject::from_vertices(&vertices).unwrap()
}

#[test]
fn test_coincident_cubes_collide() {
    let a = cube_at(Vec3::ZERO, Vec3::ONE);
    let b = cube_at(Vec3::ZERO, Vec3::ONE);

    assert_eq!(a.offset(), Vec3::ONE);
    assert_eq!(get_collision(Some(&a), Some(&b), Vec3::ZERO).unwrap(), Contact::Colliding);
    assert_eq!(collision_code(Some(&a), Some(&b), Vec3::ZERO), 1);
}

#[test]
fn test_distant_cube_is_clear_until_moved() {
    let a = cube_at(Vec3::ZERO, Vec3::ONE);
    let b = cube_at(Vec3::splat(10.0), Vec3::ONE);

    assert_eq!(collision_code(Some(&a), Some(&b), Vec3::ZERO), 0);
    assert_eq!(collision_code(Some(&a), Some(&b), Vec3::splat(9.0)), 2);
    // Phase one still wins over the move when already overlapping
    assert_eq!(collision_code(Some(&a), Some(&a), Vec3::splat(9.0)), 1);
}

#[test]
fn test_current_overlap_is_symmetric() {
    let centers = [
        Vec3::ZERO,
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(2.0, 2.0, 2.0),
        Vec3::new(2.5, 0.1, -0.3),
        Vec3::new(-1.0, 3.1, 0.5),
    ];
    let halves = [Vec3::ONE, Vec3::new(0.5, 2.0, 1.0), Vec3::splat(0.25)];

    for &ca in &centers {
        for &cb in &centers {
            for &ha in &halves {
                for &hb in &halves {
                    let a = cube_at(ca, ha);
                    let b = cube_at(cb, hb);
                    let ab = a.collision_with(&b, Vec3::ZERO);
                    let ba = b.collision_with(&a, Vec3::ZERO);
                    assert_eq!(ab == Contact::Colliding, ba == Contact::Colliding);
                }
            }
        }
    }
}

#[test]
fn test_imminent_only_shifts_the_querying_box() {
    let a = cube_at(Vec3::ZERO, Vec3::ONE);
    let b = cube_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
    let moving = Vec3::new(4.0, 0.0, 0.0);

    assert_eq!(a.collision_with(&b, moving), Contact::Imminent);
    // Same vector from b's side moves it further away
    assert_eq!(b.collision_with(&a, moving), Contact::Clear);
}

#[test]
fn test_stale_collider_until_refit() {
    let cube = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
    let player = SceneObject::with_mesh("player", &cube).unwrap();
    let wall = SceneObject::with_mesh("wall", &cube).unwrap();
    wall.set_translation(Vec3::new(10.0, 0.0, 0.0));
    wall.update_collider();

    player.set_translation(Vec3::new(9.0, 0.0, 0.0));
    // Not refit yet: still answers for the old position
    assert_eq!(player.get_collision(&wall, Vec3::ZERO).unwrap(), Contact::Clear);

    player.update_collider();
    assert_eq!(player.get_collision(&wall, Vec3::ZERO).unwrap(), Contact::Colliding);
}

#[test]
fn test_scaled_collider_grows() {
    let cube = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
    let big = SceneObject::with_mesh("big", &cube).unwrap();
    let small = SceneObject::with_mesh("small", &cube).unwrap();
    small.set_translation(Vec3::new(4.0, 0.0, 0.0));
    small.update_collider();
    big.update_collider();

    assert_eq!(big.get_collision(&small, Vec3::ZERO).unwrap(), Contact::Clear);

    big.set_scale(Vec3::splat(3.0));
    big.update_collider();
    assert_eq!(big.collider().unwrap().offset(), Vec3::splat(3.0));
    assert_eq!(big.get_collision(&small, Vec3::ZERO).unwrap(), Contact::Colliding);
}

#[test]
fn test_offset_center_mesh() {
    // Mesh not centred on its origin
    let collider = ColliderObject::from_vertices(&[2.0, 0.0, 0.0, 6.0, 2.0, 1.0]).unwrap();
    assert_eq!(collider.center(), Vec3::new(4.0, 1.0, 0.5));
    assert_eq!(collider.offset(), Vec3::new(2.0, 1.0, 0.5));
}
