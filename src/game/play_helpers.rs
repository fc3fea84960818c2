//! Small shared helpers for effect implementations.
//!
//! Effects across the card, location, and event catalogs validate the same
//! continuation shapes over and over; the checks live here so each effect
//! reads as game rules rather than plumbing.

use crate::core::{EngineError, PlayerId, ResourceMap, ResourceType, Result};
use crate::game::input::{
    SelectLocationInput, SelectPlayerInput, SelectResourcesInput, SelectWorkerPlacementInput,
    WorkerPlacement,
};
use crate::game::GameState;
use crate::locations::LocationName;

/// Validate an answered `SELECT_RESOURCES` continuation and return the
/// chosen bundle.
///
/// Checks the total against the step's bounds and every chosen type against
/// the allowed set (any material when the set is empty; VP is never
/// choosable).
pub(crate) fn validate_selected_resources(select: &SelectResourcesInput) -> Result<ResourceMap> {
    let chosen = select.client_options.resources;
    let total = chosen.total();
    if chosen.vp != 0 {
        return Err(EngineError::invalid("VP cannot be selected as a resource"));
    }
    if total < select.min_resources {
        return Err(EngineError::invalid(format!(
            "too few resources: need at least {}",
            select.min_resources
        )));
    }
    if total > select.max_resources {
        return Err(EngineError::invalid(format!(
            "too many resources: at most {}",
            select.max_resources
        )));
    }
    if !select.allowed_resources.is_empty() {
        for (ty, _) in chosen.iter() {
            if !select.allowed_resources.contains(&ty) {
                return Err(EngineError::invalid(format!("cannot select {} here", ty)));
            }
        }
    }
    Ok(chosen)
}

/// The answer to a mandatory `SELECT_PLAYER` step.
pub(crate) fn required_selected_player(select: &SelectPlayerInput) -> Result<PlayerId> {
    let selected = select
        .client_options
        .selected_player
        .ok_or_else(|| EngineError::invalid("must select a player"))?;
    if !select.player_options.contains(&selected) {
        return Err(EngineError::invalid(format!(
            "{} is not one of the offered players",
            selected
        )));
    }
    Ok(selected)
}

/// The answer to a mandatory `SELECT_LOCATION` step.
pub(crate) fn required_selected_location(select: &SelectLocationInput) -> Result<LocationName> {
    let selected = select
        .client_options
        .selected_location
        .ok_or_else(|| EngineError::invalid("must select a location"))?;
    if !select.location_options.contains(&selected) {
        return Err(EngineError::invalid(format!(
            "{} is not one of the offered locations",
            selected
        )));
    }
    Ok(selected)
}

/// The answer to a `SELECT_WORKER_PLACEMENT` step, when one was given.
pub(crate) fn selected_worker_placement(
    select: &SelectWorkerPlacementInput,
) -> Result<Option<WorkerPlacement>> {
    match select.client_options.selected {
        None if select.must_select_one => Err(EngineError::invalid("must select a worker")),
        None => Ok(None),
        Some(selected) => {
            if !select.options.contains(&selected) {
                return Err(EngineError::invalid(
                    "selection is not one of the offered workers",
                ));
            }
            Ok(Some(selected))
        }
    }
}

/// Every player id except `player_id`, in seat order.
pub(crate) fn opponents_of(game_state: &GameState, player_id: PlayerId) -> Vec<PlayerId> {
    game_state
        .players()
        .iter()
        .map(|p| p.id())
        .filter(|&id| id != player_id)
        .collect()
}

/// Pick exactly one of a set of fixed text options.
pub(crate) fn required_selected_option(
    options: &[String],
    selected: Option<&String>,
) -> Result<String> {
    let selected = selected.ok_or_else(|| EngineError::invalid("must select an option"))?;
    if !options.contains(selected) {
        return Err(EngineError::invalid(format!(
            "{} is not one of the offered options",
            selected
        )));
    }
    Ok(selected.clone())
}

/// `berry`-style one-liner: only this resource type, up to `max`.
pub(crate) fn single_resource_count(
    chosen: &ResourceMap,
    resource: ResourceType,
    max: u32,
) -> Result<u32> {
    let count = chosen.get(resource);
    if chosen.total() != count {
        return Err(EngineError::invalid(format!("only {} may be chosen", resource)));
    }
    if count > max {
        return Err(EngineError::invalid(format!(
            "too many resources, max: {}, got: {}",
            max, count
        )));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::{EffectContext, GameInputType, MultiStepMeta, SelectedResources};
    use crate::resources;

    fn select_resources(max: u32, allowed: Vec<ResourceType>, chosen: ResourceMap) -> SelectResourcesInput {
        SelectResourcesInput {
            meta: MultiStepMeta::new(GameInputType::PlayCard, EffectContext::Season),
            to_spend: false,
            min_resources: 0,
            max_resources: max,
            allowed_resources: allowed,
            client_options: SelectedResources { resources: chosen },
        }
    }

    #[test]
    fn test_validate_selected_resources_bounds() {
        let ok = select_resources(2, vec![], resources! { twig: 2 });
        assert_eq!(validate_selected_resources(&ok).unwrap(), resources! { twig: 2 });

        let too_many = select_resources(2, vec![], resources! { twig: 3 });
        assert!(validate_selected_resources(&too_many).is_err());

        let vp = select_resources(2, vec![], resources! { vp: 1 });
        assert!(validate_selected_resources(&vp).is_err());
    }

    #[test]
    fn test_validate_selected_resources_allowed_set() {
        let wrong = select_resources(3, vec![ResourceType::Berry], resources! { twig: 1 });
        assert!(validate_selected_resources(&wrong).is_err());

        let right = select_resources(3, vec![ResourceType::Berry], resources! { berry: 2 });
        assert!(validate_selected_resources(&right).is_ok());
    }

    #[test]
    fn test_single_resource_count() {
        assert_eq!(
            single_resource_count(&resources! { berry: 2 }, ResourceType::Berry, 3).unwrap(),
            2
        );
        assert!(single_resource_count(&resources! { berry: 2, twig: 1 }, ResourceType::Berry, 3)
            .is_err());
        assert!(single_resource_count(&resources! { berry: 4 }, ResourceType::Berry, 3).is_err());
    }
}
