//! Cosmetic selection and unlock state
//!
//! A persistence wrapper: read JSON from the store, mutate, write back.
//! Selection is validated against the unlock sets; unknown ids saved by an
//! older build fall back to the defaults at read time.

use serde::{Deserialize, Serialize};

use crate::loadout::{
    DEFAULT_SKIN_ID, DEFAULT_WEAPON_ID, SKINS, SkinSpec, WEAPONS, WeaponSpec, skin_by_id,
    weapon_by_id,
};
use crate::storage::KeyValueStore;

const STORAGE_KEY: &str = "shift_runner_market_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarketData {
    selected_skin: String,
    selected_weapon: String,
    unlocked_skins: Vec<String>,
    unlocked_weapons: Vec<String>,
}

impl Default for MarketData {
    fn default() -> Self {
        Self {
            selected_skin: DEFAULT_SKIN_ID.to_string(),
            selected_weapon: DEFAULT_WEAPON_ID.to_string(),
            unlocked_skins: vec![DEFAULT_SKIN_ID.to_string()],
            unlocked_weapons: vec![DEFAULT_WEAPON_ID.to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketManager {
    data: MarketData,
}

impl MarketManager {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let data = store
            .get(STORAGE_KEY)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(data) => Some(data),
                Err(e) => {
                    log::warn!("Corrupt market data, using defaults: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self { data }
    }

    fn save(&self, store: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(&self.data) {
            store.set(STORAGE_KEY, &json);
        }
    }

    /// Selected skin, falling back to the default if the saved id is gone.
    pub fn selected_skin(&self) -> SkinSpec {
        skin_by_id(&self.data.selected_skin)
            .copied()
            .unwrap_or_else(crate::loadout::default_skin)
    }

    pub fn selected_weapon(&self) -> WeaponSpec {
        weapon_by_id(&self.data.selected_weapon)
            .copied()
            .unwrap_or_else(crate::loadout::default_weapon)
    }

    pub fn is_skin_unlocked(&self, id: &str) -> bool {
        self.data.unlocked_skins.iter().any(|s| s == id)
    }

    pub fn is_weapon_unlocked(&self, id: &str) -> bool {
        self.data.unlocked_weapons.iter().any(|w| w == id)
    }

    /// Select a skin if it is unlocked. Returns whether selection changed.
    pub fn select_skin(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        if !self.is_skin_unlocked(id) || skin_by_id(id).is_none() {
            return false;
        }
        self.data.selected_skin = id.to_string();
        self.save(store);
        true
    }

    pub fn select_weapon(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        if !self.is_weapon_unlocked(id) || weapon_by_id(id).is_none() {
            return false;
        }
        self.data.selected_weapon = id.to_string();
        self.save(store);
        true
    }

    /// Record an unlock (the host handles pricing via progression coins).
    pub fn unlock_skin(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        if skin_by_id(id).is_none() || self.is_skin_unlocked(id) {
            return false;
        }
        self.data.unlocked_skins.push(id.to_string());
        self.save(store);
        true
    }

    pub fn unlock_weapon(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        if weapon_by_id(id).is_none() || self.is_weapon_unlocked(id) {
            return false;
        }
        self.data.unlocked_weapons.push(id.to_string());
        self.save(store);
        true
    }

    pub fn unlocked_skin_count(&self) -> usize {
        self.data.unlocked_skins.len()
    }

    pub fn skin_catalog(&self) -> &'static [SkinSpec] {
        &SKINS
    }

    pub fn weapon_catalog(&self) -> &'static [WeaponSpec] {
        &WEAPONS
    }
}
