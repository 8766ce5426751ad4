//! The square toroidal grid holding one citizen per cell.
use rand::Rng;

use crate::epidemic::age::sample_age;
use crate::epidemic::citizen::{Citizen, CitizenId, HealthState};
use crate::epidemic::parameters::Parameters;

#[derive(Debug, Clone)]
pub struct PopulationGrid {
    side: usize,
    // Row-major
    citizens: Vec<Citizen>,
}

impl PopulationGrid {
    /// Fills every cell with a healthy citizen whose hospitality, severity
    /// score and age are drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(params: &Parameters, rng: &mut R) -> PopulationGrid {
        let side = params.grid_side;
        let mut citizens = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                let hospitality = rng
                    .random_range(0..100_u32)
                    .saturating_add(params.base_hospitality);
                let severity = rng.random_range(0..4);
                let age = sample_age(rng, &params.age_groups_density);
                citizens.push(Citizen::new(
                    CitizenId::new(row, col),
                    hospitality,
                    severity,
                    age,
                ));
            }
        }
        PopulationGrid { side, citizens }
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    fn index(&self, id: CitizenId) -> usize {
        assert!(
            id.row < self.side && id.col < self.side,
            "Citizen {id} is outside a grid of side {}",
            self.side
        );
        id.row * self.side + id.col
    }

    /// # Panics
    ///
    /// Panics if `id` lies outside the grid.
    #[must_use]
    pub fn get(&self, id: CitizenId) -> &Citizen {
        &self.citizens[self.index(id)]
    }

    /// # Panics
    ///
    /// Panics if `id` lies outside the grid.
    pub fn get_mut(&mut self, id: CitizenId) -> &mut Citizen {
        let index = self.index(id);
        &mut self.citizens[index]
    }

    /// Citizen id for the given linear (row-major) index.
    #[must_use]
    pub fn id_at(&self, index: usize) -> CitizenId {
        CitizenId::new(index / self.side, index % self.side)
    }

    /// Citizens in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Citizen> {
        self.citizens.iter_mut()
    }

    /// The cell `(dh, dv)` away from `id`, wrapping around both edges.
    #[must_use]
    pub fn offset(&self, id: CitizenId, dh: isize, dv: isize) -> CitizenId {
        CitizenId::new(
            wrap(id.row, dh, self.side),
            wrap(id.col, dv, self.side),
        )
    }

    /// Advances `days_in_state` for everyone still alive.
    pub fn tick_day(&mut self) {
        for citizen in self.living_mut() {
            citizen.days_in_state += 1;
        }
    }

    /// Ages everyone still alive by one year.
    pub fn tick_year(&mut self) {
        for citizen in self.living_mut() {
            citizen.age += 1;
        }
    }

    #[must_use]
    pub fn count_in(&self, state: HealthState) -> usize {
        self.citizens.iter().filter(|c| c.state == state).count()
    }

    fn living_mut(&mut self) -> impl Iterator<Item = &mut Citizen> {
        self.citizens
            .iter_mut()
            .filter(|c| c.state != HealthState::Dead)
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn wrap(coordinate: usize, delta: isize, side: usize) -> usize {
    (coordinate as isize + delta).rem_euclid(side as isize) as usize
}
