//! Text stand-in for the battle HUD.
//!
//! Each fighter gets the same three bars the sprite HUD draws (HP, defense,
//! mana or stamina) as fixed-width ASCII, plus its current clip and frame.
//! The game shows the result in the window title and logs it at debug.

use duel_core::actor::Seat;
use duel_core::battle::{BattleSnapshot, FighterSnapshot};
use duel_core::character::BASE_STATS;
use duel_core::resource::RESOURCE_MAX;

use crate::flow::{GameFlow, Scene};
use crate::inventory::Inventory;

const BAR_WIDTH: usize = 10;

/// `HP [#####.....] 50/100`. Values above `max` draw a full bar.
pub fn stat_bar(label: &str, current: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        (current.min(max) as usize * BAR_WIDTH) / max as usize
    };
    format!(
        "{label} [{}{}] {current}/{max}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled)
    )
}

pub fn fighter_line(fighter: &FighterSnapshot) -> String {
    format!(
        "{} {} | {} | {} | {} | {}#{}",
        fighter.seat.label(),
        fighter.kind,
        stat_bar("HP", fighter.health, BASE_STATS.health),
        stat_bar("Def", fighter.defense, BASE_STATS.defense),
        stat_bar(
            fighter.resource_kind.label(),
            fighter.resource_value,
            RESOURCE_MAX
        ),
        fighter.clip,
        fighter.frame
    )
}

pub fn battle_lines(snapshot: &BattleSnapshot) -> [String; 2] {
    Seat::BOTH.map(|seat| fighter_line(snapshot.fighter(seat)))
}

/// Window title for whatever the flow is showing.
pub fn window_title(flow: &GameFlow, inventory: &Inventory) -> String {
    match flow.scene() {
        Scene::Menu => "Duel Arena | Enter: fight  S: settings  Esc: quit".to_string(),
        Scene::Settings => format!(
            "Duel Arena | Arena: {} | 1 Castle  2 Dead Forest  3 Terrace  4 Throne Room",
            flow.arena().name()
        ),
        Scene::Inventory => format!(
            "Duel Arena | {} ({} items) vs {} ({} items) | Enter: start",
            flow.selection(Seat::One),
            inventory.item_count(Seat::One),
            flow.selection(Seat::Two),
            inventory.item_count(Seat::Two)
        ),
        Scene::Battle => match flow.last_snapshot() {
            Some(snapshot) => {
                let [one, two] = battle_lines(snapshot);
                format!("{one} || {two}")
            }
            None => "Duel Arena".to_string(),
        },
    }
}
