//! Static weapon and skin tables
//!
//! Thin data, no logic: the run config reads damage/speed/visual from the
//! selected weapon and max health from the selected skin.

/// How a weapon's projectile is presented (the sim only carries it through)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileVisual {
    Sphere,
    Laser,
}

#[derive(Debug, Clone, Copy)]
pub struct WeaponSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub damage: u8,
    pub shot_speed: f32,
    pub visual: ProjectileVisual,
}

#[derive(Debug, Clone, Copy)]
pub struct SkinSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub max_health: u8,
}

pub const WEAPONS: [WeaponSpec; 11] = [
    WeaponSpec { id: "w_machinegun", name: "Machine Gun", damage: 1, shot_speed: 12.0, visual: ProjectileVisual::Sphere },
    WeaponSpec { id: "w_blaster", name: "Blaster", damage: 2, shot_speed: 12.0, visual: ProjectileVisual::Sphere },
    WeaponSpec { id: "w_chaingun", name: "Chain Gun", damage: 3, shot_speed: 12.0, visual: ProjectileVisual::Sphere },
    WeaponSpec { id: "w_glauncher", name: "Grenade Launcher", damage: 4, shot_speed: 12.0, visual: ProjectileVisual::Sphere },
    WeaponSpec { id: "w_hyperblaster", name: "Hyper Blaster", damage: 5, shot_speed: 12.0, visual: ProjectileVisual::Sphere },
    WeaponSpec { id: "w_railgun", name: "Railgun", damage: 6, shot_speed: 20.0, visual: ProjectileVisual::Laser },
    WeaponSpec { id: "w_rlauncher", name: "Rocket Launcher", damage: 7, shot_speed: 20.0, visual: ProjectileVisual::Laser },
    WeaponSpec { id: "w_shotgun", name: "Shotgun", damage: 8, shot_speed: 20.0, visual: ProjectileVisual::Laser },
    WeaponSpec { id: "w_sshotgun", name: "Super Shotgun", damage: 9, shot_speed: 20.0, visual: ProjectileVisual::Laser },
    WeaponSpec { id: "weapon", name: "Plasma Gun", damage: 10, shot_speed: 20.0, visual: ProjectileVisual::Laser },
    // One-shot kill
    WeaponSpec { id: "w_bfg", name: "BFG 9000", damage: 11, shot_speed: 20.0, visual: ProjectileVisual::Laser },
];

pub const SKINS: [SkinSpec; 5] = [
    SkinSpec { id: "ratamahatta", name: "Ratamahatta", max_health: 3 },
    SkinSpec { id: "ctf_b", name: "Blue Team", max_health: 3 },
    SkinSpec { id: "ctf_r", name: "Red Team", max_health: 3 },
    SkinSpec { id: "dead", name: "Undead", max_health: 4 },
    SkinSpec { id: "gearwhore", name: "Gearwhore", max_health: 4 },
];

pub fn weapon_by_id(id: &str) -> Option<&'static WeaponSpec> {
    WEAPONS.iter().find(|w| w.id == id)
}

pub fn skin_by_id(id: &str) -> Option<&'static SkinSpec> {
    SKINS.iter().find(|s| s.id == id)
}

pub const DEFAULT_WEAPON_ID: &str = "w_glauncher";
pub const DEFAULT_SKIN_ID: &str = "ratamahatta";

pub fn default_weapon() -> WeaponSpec {
    *weapon_by_id(DEFAULT_WEAPON_ID).expect("default weapon in table")
}

pub fn default_skin() -> SkinSpec {
    *skin_by_id(DEFAULT_SKIN_ID).expect("default skin in table")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(weapon_by_id("w_bfg").unwrap().damage, 11);
        assert_eq!(skin_by_id("dead").unwrap().max_health, 4);
        assert!(weapon_by_id("w_nope").is_none());
    }

    #[test]
    fn test_defaults_exist() {
        assert_eq!(default_weapon().id, DEFAULT_WEAPON_ID);
        assert_eq!(default_skin().id, DEFAULT_SKIN_ID);
    }

    #[test]
    fn test_ids_unique() {
        for (i, w) in WEAPONS.iter().enumerate() {
            assert!(WEAPONS.iter().skip(i + 1).all(|o| o.id != w.id));
        }
    }
}
