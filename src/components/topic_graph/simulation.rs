//! Force relaxation layout.
//!
//! Each tick cools `alpha` toward `alpha_target`, accumulates link, charge and
//! collision forces into node velocities, recenters the centroid, then
//! integrates. Pinned bodies are written back to their pin every tick.

use std::f64::consts::PI;

use super::types::{GraphEdge, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct ForceParameters {
	/// Rest length of a link.
	pub link_distance: f64,
	/// Negative values repel.
	pub charge_strength: f64,
	/// Minimum distance between two node centers.
	pub collision_separation: f64,
	pub collision_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Settle target while a node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceParameters {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 200.0,
			charge_strength: -500.0,
			collision_separation: 30.0,
			collision_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
		}
	}
}

#[derive(Clone, Debug, Default)]
struct Body {
	pos: Point,
	vx: f64,
	vy: f64,
	pin: Option<Point>,
}

struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Deterministic jitter source used to split coincident nodes.
struct Lcg(u32);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

pub struct Simulation {
	bodies: Vec<Body>,
	links: Vec<Link>,
	params: ForceParameters,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	rng: Lcg,
}

impl Simulation {
	/// Seeds bodies on a phyllotaxis spiral around `center`.
	pub fn new(
		node_count: usize,
		edges: &[GraphEdge],
		center: Point,
		params: ForceParameters,
	) -> Self {
		let golden = PI * (3.0 - 5f64.sqrt());
		let bodies = (0..node_count)
			.map(|i| {
				let r = 10.0 * (0.5 + i as f64).sqrt();
				let a = i as f64 * golden;
				Body {
					pos: Point::new(center.x + r * a.cos(), center.y + r * a.sin()),
					..Body::default()
				}
			})
			.collect();
		Self::with_bodies(bodies, edges, center, params)
	}

	/// Starts from fixed positions, e.g. a circular placement.
	pub fn from_positions(
		positions: &[Point],
		edges: &[GraphEdge],
		center: Point,
		params: ForceParameters,
	) -> Self {
		let bodies = positions
			.iter()
			.map(|&pos| Body {
				pos,
				..Body::default()
			})
			.collect();
		Self::with_bodies(bodies, edges, center, params)
	}

	fn with_bodies(
		bodies: Vec<Body>,
		edges: &[GraphEdge],
		center: Point,
		params: ForceParameters,
	) -> Self {
		let mut degree = vec![0usize; bodies.len()];
		for e in edges {
			degree[e.source] += 1;
			degree[e.target] += 1;
		}
		let links = edges
			.iter()
			.map(|e| {
				let (ds, dt) = (degree[e.source] as f64, degree[e.target] as f64);
				Link {
					source: e.source,
					target: e.target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			bodies,
			links,
			params,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			rng: Lcg(1),
		}
	}

	pub fn params(&self) -> &ForceParameters {
		&self.params
	}

	pub fn position(&self, idx: usize) -> Point {
		self.bodies[idx].pos
	}

	#[cfg(test)]
	pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
		self.bodies.iter().map(|b| b.pos)
	}

	pub fn set_positions(&mut self, positions: &[Point]) {
		for (body, &pos) in self.bodies.iter_mut().zip(positions) {
			body.pos = pos;
			body.vx = 0.0;
			body.vy = 0.0;
		}
		self.hold_pins();
	}

	pub fn pin(&self, idx: usize) -> Option<Point> {
		self.bodies[idx].pin
	}

	pub fn set_pin(&mut self, idx: usize, pin: Option<Point>) {
		let body = &mut self.bodies[idx];
		body.pin = pin;
		if let Some(p) = pin {
			body.pos = p;
			body.vx = 0.0;
			body.vy = 0.0;
		}
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes ticking after the simulation settled.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn reheat(&mut self) {
		self.alpha = 1.0;
		self.restart();
	}

	/// Advances one step. Returns false once settled.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.apply_links();
		self.apply_charge();
		self.apply_collision();
		self.apply_center();

		let keep = 1.0 - self.params.velocity_decay;
		for body in &mut self.bodies {
			if let Some(p) = body.pin {
				body.pos = p;
				body.vx = 0.0;
				body.vy = 0.0;
			} else {
				body.vx *= keep;
				body.vy *= keep;
				body.pos.x += body.vx;
				body.pos.y += body.vy;
			}
		}

		if self.alpha < self.params.alpha_min {
			self.running = false;
			log::debug!("layout settled (alpha {:.4})", self.alpha);
		}
		true
	}

	/// Snaps pinned bodies to their pins without running any force.
	pub fn hold_pins(&mut self) {
		for body in &mut self.bodies {
			if let Some(p) = body.pin {
				body.pos = p;
			}
		}
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		let distance = self.params.link_distance;
		for link in &self.links {
			let (s, t) = (&self.bodies[link.source], &self.bodies[link.target]);
			let mut x = t.pos.x + t.vx - s.pos.x - s.vx;
			let mut y = t.pos.y + t.vy - s.pos.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let l = x.hypot(y);
			let k = (l - distance) / l * alpha * link.strength;
			let (fx, fy) = (x * k, y * k);

			let t = &mut self.bodies[link.target];
			t.vx -= fx * link.bias;
			t.vy -= fy * link.bias;
			let s = &mut self.bodies[link.source];
			s.vx += fx * (1.0 - link.bias);
			s.vy += fy * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let w = self.params.charge_strength * self.alpha;
		let n = self.bodies.len();
		for i in 0..n {
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = self.bodies[j].pos.x - self.bodies[i].pos.x;
				let mut y = self.bodies[j].pos.y - self.bodies[i].pos.y;
				if x == 0.0 {
					x = self.rng.jiggle();
				}
				if y == 0.0 {
					y = self.rng.jiggle();
				}
				let mut l = x * x + y * y;
				if l < 1.0 {
					l = l.sqrt();
				}
				dvx += x * w / l;
				dvy += y * w / l;
			}
			self.bodies[i].vx += dvx;
			self.bodies[i].vy += dvy;
		}
	}

	fn apply_collision(&mut self) {
		let min_sep = self.params.collision_separation;
		let strength = self.params.collision_strength;
		let n = self.bodies.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				let mut x = (a.pos.x + a.vx) - (b.pos.x + b.vx);
				let mut y = (a.pos.y + a.vy) - (b.pos.y + b.vy);
				let l2 = x * x + y * y;
				if l2 >= min_sep * min_sep {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
				}
				if y == 0.0 {
					y = self.rng.jiggle();
				}
				let l = x.hypot(y);
				let k = (min_sep - l) / l * strength * 0.5;
				let (fx, fy) = (x * k, y * k);
				self.bodies[i].vx += fx;
				self.bodies[i].vy += fy;
				self.bodies[j].vx -= fx;
				self.bodies[j].vy -= fy;
			}
		}
	}

	fn apply_center(&mut self) {
		if self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.pos.x, sy + b.pos.y));
		let (dx, dy) = (sx / n - self.center.x, sy / n - self.center.y);
		for body in &mut self.bodies {
			body.pos.x -= dx;
			body.pos.y -= dy;
		}
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::assert_approx_eq;

	use super::*;

	fn edge(source: usize, target: usize) -> GraphEdge {
		GraphEdge { source, target }
	}

	fn run(sim: &mut Simulation, ticks: usize) {
		for _ in 0..ticks {
			sim.tick();
		}
	}

	#[test]
	fn defaults_match_layout_constants() {
		let p = ForceParameters::default();
		assert_eq!(p.link_distance, 200.0);
		assert_eq!(p.charge_strength, -500.0);
		assert_eq!(p.collision_separation, 30.0);
		assert_approx_eq!(f64, (1.0 - p.alpha_decay).powi(300), p.alpha_min, epsilon = 1e-12);
	}

	#[test]
	fn connected_pair_relaxes_near_link_distance() {
		let center = Point::new(400.0, 300.0);
		let mut sim = Simulation::new(2, &[edge(0, 1)], center, ForceParameters::default());
		run(&mut sim, 300);

		let d = sim.position(0).distance(sim.position(1));
		// Charge pushes the pair slightly past the link rest length.
		assert!(d > 150.0 && d < 320.0, "distance {d}");
	}

	#[test]
	fn centroid_stays_at_center() {
		let center = Point::new(250.0, 150.0);
		let edges = [edge(0, 1), edge(2, 3)];
		let mut sim = Simulation::new(4, &edges, center, ForceParameters::default());
		run(&mut sim, 50);

		let (sx, sy) = sim
			.positions()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		assert_approx_eq!(f64, sx / 4.0, center.x, epsilon = 1e-6);
		assert_approx_eq!(f64, sy / 4.0, center.y, epsilon = 1e-6);
	}

	#[test]
	fn collision_separates_coincident_nodes() {
		let params = ForceParameters {
			charge_strength: 0.0,
			..ForceParameters::default()
		};
		let start = [Point::new(100.0, 100.0), Point::new(100.0, 100.0)];
		let mut sim = Simulation::from_positions(&start, &[], Point::new(100.0, 100.0), params);
		run(&mut sim, 200);
		assert!(sim.position(0).distance(sim.position(1)) > 20.0);
	}

	#[test]
	fn pinned_body_never_moves() {
		let center = Point::new(200.0, 200.0);
		let edges = [edge(0, 1), edge(1, 2)];
		let mut sim = Simulation::new(3, &edges, center, ForceParameters::default());
		let pin = Point::new(10.0, 20.0);
		sim.set_pin(1, Some(pin));
		for _ in 0..100 {
			sim.tick();
			assert_eq!(sim.position(1), pin);
		}
	}

	#[test]
	fn settles_and_restarts() {
		let origin = Point::new(0.0, 0.0);
		let mut sim = Simulation::new(3, &[edge(0, 1)], origin, ForceParameters::default());
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < sim.params().alpha_min);

		sim.set_alpha_target(0.3);
		sim.restart();
		assert!(sim.tick());
		let warmed = sim.alpha();
		run(&mut sim, 20);
		assert!(sim.alpha() > warmed);
	}
}
