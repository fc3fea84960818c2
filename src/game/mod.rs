//! The game aggregate: inputs, players, and the state machine.

pub mod input;
pub mod json;
pub(crate) mod play_helpers;
pub mod player;
pub mod state;

pub use input::{
    ClaimEventInput, DiscardCardsInput, EffectContext, GameInput, GameInputType, MultiStepMeta,
    PaymentOptions, PlaceWorkerInput, PlayCardInput, PlayedCardId, SelectCardsInput,
    SelectLocationInput, SelectOptionGenericInput, SelectPaymentForCardInput,
    SelectPlayedCardsInput, SelectPlayerInput, SelectResourcesInput, SelectWorkerPlacementInput,
    VisitDestinationCardInput, WorkerPlacement,
};
pub use json::{CardStackJson, GameStateJson, PlayerJson};
pub use player::{PaymentDiscount, Player, PlayerStatus, MAX_CITY_SIZE, MAX_HAND_SIZE};
pub use state::{GameLogEntry, GameState, NewGameOptions, MEADOW_SIZE};
