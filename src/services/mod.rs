//! Typed wrappers over the card endpoints. No logic beyond shaping requests.

pub mod appearance;
pub mod cards;
pub mod links;

pub use appearance::CardAppearanceService;
pub use cards::CardsService;
pub use links::CardLinksService;
