use log::{debug, info, trace};
use polycover_geometry::PolygonWithHoles;

use crate::{Costs, Cover, CoverProvider, Error, Rectangle, RuntimeEnvironment};

/// Weighted greedy set cover over all rectangles enumerable from the base
/// rectangle graph.
///
/// Every candidate rectangle is queued with its cost per unit of *effective*
/// area, the area of its base rectangles not yet covered. The seed pick is
/// the largest-area candidate; afterwards the candidate with the lowest cost
/// per unit wins, ties broken towards larger effective area.
#[derive(Debug, Default)]
pub struct GreedySetCover;

#[derive(Debug, Clone)]
struct QueueEntry {
    rectangle: Rectangle,
    area: u64,
    effective_area: u64,
    cost: u64,
    cost_per_unit: f64,
}

impl QueueEntry {
    fn new(rectangle: Rectangle, costs: &Costs) -> Self {
        let area = rectangle.area();
        let cost = costs.total_of_rectangle(&rectangle);
        Self {
            rectangle,
            area,
            effective_area: area,
            cost,
            cost_per_unit: cost as f64 / area as f64,
        }
    }

    /// Account for a newly picked rectangle. The entry's effective area
    /// drops by the area of each newly covered base rectangle it fully
    /// contains; an entry fully inside the pick drops to zero.
    fn update(&mut self, picked: &Rectangle, newly_covered: &[Rectangle]) {
        if !picked.intersects(&self.rectangle) {
            return;
        }

        if picked.fully_contains(&self.rectangle) {
            self.effective_area = 0;
            return;
        }

        for base in newly_covered {
            if self.rectangle.fully_contains(base) {
                trace!(
                    "entry {} loses base {} ({} area units)",
                    self.rectangle,
                    base,
                    base.area()
                );
                self.effective_area = self.effective_area.saturating_sub(base.area());
            }
        }

        if self.effective_area > 0 {
            self.cost_per_unit = self.cost as f64 / self.effective_area as f64;
        }
    }
}

impl CoverProvider for GreedySetCover {
    fn cover_for(
        &self,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error> {
        info!("greedy set cover running over the base rectangle graph");

        env.graph(polygon)?;
        let graph = &env.graph;
        let nodes = graph.nodes();

        let mut queue: Vec<QueueEntry> = graph
            .all_rectangles()
            .into_iter()
            .map(|r| QueueEntry::new(r, costs))
            .collect();

        // bootstrap with the largest candidate: cost-free preference for
        // covering as much as possible first
        let mut best = queue
            .iter()
            .enumerate()
            .max_by_key(|(i, e)| (e.area, usize::MAX - i))
            .map(|(i, _)| i);

        let mut cover: Cover = Vec::new();
        let mut covered = vec![false; nodes.len()];
        let mut covered_count = 0usize;

        while let Some(best_index) = best {
            let picked = queue[best_index].rectangle;
            debug!(
                "{} candidate(s) left, picking {picked} (cpu {})",
                queue.len(),
                queue[best_index].cost_per_unit
            );

            let mut newly_covered: Vec<Rectangle> = Vec::new();
            for id in graph.contained(picked.top_right(), picked.bottom_left()) {
                if !covered[id] {
                    covered[id] = true;
                    covered_count += 1;
                    newly_covered.push(nodes[id].base);
                }
            }

            cover.push(picked);
            queue.swap_remove(best_index);

            debug!("{covered_count} / {} base rectangle(s) covered", nodes.len());
            if covered_count == nodes.len() {
                break;
            }

            // update the queue in place, dropping exhausted entries and
            // reselecting the cheapest candidate as we go
            best = None;
            let mut best_cpu = f64::INFINITY;
            let mut index = 0usize;
            while index < queue.len() {
                queue[index].update(&picked, &newly_covered);
                if queue[index].effective_area == 0 {
                    queue.swap_remove(index);
                    continue;
                }
                let entry = &queue[index];
                let better = entry.cost_per_unit < best_cpu
                    || (entry.cost_per_unit == best_cpu
                        && best.is_some_and(|b: usize| {
                            entry.effective_area > queue[b].effective_area
                        }));
                if better {
                    best = Some(index);
                    best_cpu = entry.cost_per_unit;
                }
                index += 1;
            }
        }

        info!("greedy set cover finished with {} rectangle(s)", cover.len());
        Ok(cover)
    }
}
