use eframe::egui::Vec2;

use super::SimNode;

const MIN_DISTANCE: f32 = 1.0;

/// Pairwise inverse-square push. Coincident nodes have no direction to
/// push along and are left alone.
pub(super) fn apply_repulsion(nodes: &mut [SimNode], repulsion: f32) {
    for first in 0..nodes.len() {
        for second in (first + 1)..nodes.len() {
            let delta = nodes[first].position - nodes[second].position;
            let distance = delta.length().max(MIN_DISTANCE);
            let force = repulsion / (distance * distance);
            let push = delta / distance * force;

            let first_mass = nodes[first].mass;
            let second_mass = nodes[second].mass;
            nodes[first].velocity += push / first_mass;
            nodes[second].velocity -= push / second_mass;
        }
    }
}

/// Hookean spring along every edge toward `link_distance`.
pub(super) fn apply_attraction(
    nodes: &mut [SimNode],
    edges: &[(usize, usize)],
    attraction: f32,
    link_distance: f32,
) {
    for &(from, to) in edges {
        let delta = nodes[to].position - nodes[from].position;
        let distance = delta.length().max(MIN_DISTANCE);
        let force = (distance - link_distance) * attraction;
        let pull = delta / distance * force;

        let from_mass = nodes[from].mass;
        let to_mass = nodes[to].mass;
        nodes[from].velocity += pull / from_mass;
        nodes[to].velocity -= pull / to_mass;
    }
}

pub(super) fn apply_centering(nodes: &mut [SimNode], center_force: f32) {
    for node in nodes {
        node.velocity -= node.position * center_force;
    }
}

pub(super) fn integrate(nodes: &mut [SimNode], damping: f32, max_speed: f32) {
    for node in nodes {
        node.velocity *= damping;
        node.velocity = clamp_speed(node.velocity, max_speed);
        node.position += node.velocity;
    }
}

fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed > max_speed && speed > 0.0 {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn node(x: f32, y: f32, mass: f32) -> SimNode {
        SimNode {
            id: String::new(),
            position: vec2(x, y),
            velocity: Vec2::ZERO,
            mass,
        }
    }

    #[test]
    fn test_repulsion_is_inverse_square() {
        let mut nodes = vec![node(0.0, 0.0, 1.0), node(20.0, 0.0, 1.0)];
        apply_repulsion(&mut nodes, 400.0);
        assert!((nodes[0].velocity.x + 1.0).abs() < 1e-5);
        assert!((nodes[1].velocity.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_repulsion_floors_distance() {
        let mut nodes = vec![node(0.0, 0.0, 1.0), node(0.5, 0.0, 1.0)];
        apply_repulsion(&mut nodes, 400.0);
        // 400 / 1^2 along a 0.5 offset scaled by 1/1.
        assert!((nodes[1].velocity.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_spring_pulls_and_pushes() {
        let mut stretched = vec![node(0.0, 0.0, 1.0), node(150.0, 0.0, 1.0)];
        apply_attraction(&mut stretched, &[(0, 1)], 0.01, 50.0);
        assert!(stretched[0].velocity.x > 0.0);
        assert!(stretched[1].velocity.x < 0.0);
        assert!((stretched[0].velocity.x - 1.0).abs() < 1e-5);

        let mut compressed = vec![node(0.0, 0.0, 1.0), node(10.0, 0.0, 1.0)];
        apply_attraction(&mut compressed, &[(0, 1)], 0.01, 50.0);
        assert!(compressed[0].velocity.x < 0.0);
        assert!(compressed[1].velocity.x > 0.0);
    }

    #[test]
    fn test_integrate_damps_then_clamps() {
        let mut nodes = vec![node(0.0, 0.0, 1.0)];
        nodes[0].velocity = vec2(30.0, 40.0);
        integrate(&mut nodes, 0.5, 10.0);
        assert!((nodes[0].velocity.length() - 10.0).abs() < 1e-4);
        assert!((nodes[0].position - vec2(6.0, 8.0)).length() < 1e-4);

        nodes[0].velocity = vec2(2.0, 0.0);
        integrate(&mut nodes, 0.5, 10.0);
        assert_eq!(nodes[0].velocity, vec2(1.0, 0.0));
    }
}
