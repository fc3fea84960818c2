//! Resource counters.
//!
//! Five resource types circulate in a game: three building materials (twig,
//! resin, pebble), one food (berry), and victory points. `ResourceMap` is a
//! dense bundle of counters used everywhere a quantity of resources appears:
//! player supplies, card costs, payments, and resources stored on played
//! cards or claimed events.
//!
//! Counters are unsigned and never go negative; spending is checked.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// One kind of resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Twig,
    Resin,
    Pebble,
    Berry,
    Vp,
}

impl ResourceType {
    /// All five resource types.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Twig,
        ResourceType::Resin,
        ResourceType::Pebble,
        ResourceType::Berry,
        ResourceType::Vp,
    ];

    /// The four spendable materials (everything but VP).
    pub const MATERIALS: [ResourceType; 4] = [
        ResourceType::Twig,
        ResourceType::Resin,
        ResourceType::Pebble,
        ResourceType::Berry,
    ];
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceType::Twig => "TWIG",
            ResourceType::Resin => "RESIN",
            ResourceType::Pebble => "PEBBLE",
            ResourceType::Berry => "BERRY",
            ResourceType::Vp => "VP",
        };
        write!(f, "{}", s)
    }
}

/// A bundle of resource counters.
///
/// Doubles as a card cost (costs carry no VP component) and as a payment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMap {
    #[serde(default)]
    pub twig: u32,
    #[serde(default)]
    pub resin: u32,
    #[serde(default)]
    pub pebble: u32,
    #[serde(default)]
    pub berry: u32,
    #[serde(default)]
    pub vp: u32,
}

impl ResourceMap {
    /// The empty bundle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            twig: 0,
            resin: 0,
            pebble: 0,
            berry: 0,
            vp: 0,
        }
    }

    /// Get the counter for one resource type.
    #[must_use]
    pub fn get(&self, ty: ResourceType) -> u32 {
        match ty {
            ResourceType::Twig => self.twig,
            ResourceType::Resin => self.resin,
            ResourceType::Pebble => self.pebble,
            ResourceType::Berry => self.berry,
            ResourceType::Vp => self.vp,
        }
    }

    /// Set the counter for one resource type.
    pub fn set(&mut self, ty: ResourceType, count: u32) {
        match ty {
            ResourceType::Twig => self.twig = count,
            ResourceType::Resin => self.resin = count,
            ResourceType::Pebble => self.pebble = count,
            ResourceType::Berry => self.berry = count,
            ResourceType::Vp => self.vp = count,
        }
    }

    /// Add to one counter.
    pub fn add(&mut self, ty: ResourceType, count: u32) {
        self.set(ty, self.get(ty) + count);
    }

    /// Add every counter of `other` to this bundle.
    pub fn add_all(&mut self, other: &ResourceMap) {
        for ty in ResourceType::ALL {
            self.add(ty, other.get(ty));
        }
    }

    /// Subtract every counter of `other`, failing if any counter would go
    /// negative.
    pub fn checked_sub_all(&mut self, other: &ResourceMap) -> Result<()> {
        for ty in ResourceType::ALL {
            if self.get(ty) < other.get(ty) {
                return Err(EngineError::illegal(format!(
                    "insufficient {}: have {}, need {}",
                    ty,
                    self.get(ty),
                    other.get(ty)
                )));
            }
        }
        for ty in ResourceType::ALL {
            self.set(ty, self.get(ty) - other.get(ty));
        }
        Ok(())
    }

    /// Sum of all counters, VP included.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.twig + self.resin + self.pebble + self.berry + self.vp
    }

    /// Sum of the four material counters (VP excluded).
    #[must_use]
    pub fn total_materials(&self) -> u32 {
        self.twig + self.resin + self.pebble + self.berry
    }

    /// True if every counter is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over `(type, count)` pairs with non-zero counts.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        ResourceType::ALL
            .into_iter()
            .map(move |ty| (ty, self.get(ty)))
            .filter(|(_, count)| *count > 0)
    }

    /// Render as a compact `2 TWIG, 1 RESIN` style string for the game log.
    #[must_use]
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .iter()
            .map(|(ty, count)| format!("{} {}", count, ty))
            .collect();
        if parts.is_empty() {
            "nothing".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Literal constructor for a [`ResourceMap`].
///
/// ```
/// use evergrove::resources;
/// let cost = resources! { twig: 2, resin: 1 };
/// assert_eq!(cost.twig, 2);
/// assert_eq!(cost.berry, 0);
/// ```
#[macro_export]
macro_rules! resources {
    ( $( $field:ident : $count:expr ),* $(,)? ) => {
        $crate::core::ResourceMap {
            $( $field: $count, )*
            ..$crate::core::ResourceMap::new()
        }
    };
}
