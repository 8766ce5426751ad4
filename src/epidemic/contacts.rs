//! Daily contact sampling among the toroidal neighbors of a citizen.
use rand::Rng;

use crate::epidemic::citizen::{Citizen, CitizenId};
use crate::epidemic::population::PopulationGrid;
use crate::random::percent_chance;

/// Offsets within `radius` on both axes, the center excluded, ordered by
/// row offset then column offset.
#[allow(clippy::cast_possible_wrap)]
pub fn neighbor_offsets(radius: usize) -> impl Iterator<Item = (isize, isize)> {
    let radius = radius as isize;
    (-radius..=radius)
        .flat_map(move |dh| (-radius..=radius).map(move |dv| (dh, dv)))
        .filter(|&offset| offset != (0, 0))
}

/// Number of contacts a citizen may make today.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn contact_budget(max_contacts: u32, modifier: f64) -> usize {
    (f64::from(max_contacts) * modifier).floor() as usize
}

/// Walks the neighbors of `reference` in offset order, accepting each with
/// the reference citizen's hospitality as percent chance, until `budget`
/// contacts are accepted or the neighborhood is exhausted.
pub fn sample_contacts<R: Rng + ?Sized>(
    grid: &PopulationGrid,
    reference: &Citizen,
    radius: usize,
    budget: usize,
    rng: &mut R,
) -> Vec<CitizenId> {
    let mut contacts = Vec::new();
    if budget == 0 {
        return contacts;
    }
    for (dh, dv) in neighbor_offsets(radius) {
        let neighbor = grid.offset(reference.id, dh, dv);
        if percent_chance(rng, reference.hospitality) {
            contacts.push(neighbor);
            if contacts.len() == budget {
                break;
            }
        }
    }
    contacts
}
