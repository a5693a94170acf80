//! Opening catalogue: built-in seed set and per-user overviews.

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::*;

struct SeedOpening {
    name: &'static str,
    eco: &'static str,
    moves: &'static [&'static str],
    side: Side,
    description: &'static str,
    difficulty: Difficulty,
}

const BUILTIN_OPENINGS: &[SeedOpening] = &[
    SeedOpening {
        name: "Italian Game",
        eco: "C50",
        moves: &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "c3", "Nf6", "d4", "exd4"],
        side: Side::White,
        description: "A classical opening focusing on central control and quick development.",
        difficulty: Difficulty::Beginner,
    },
    SeedOpening {
        name: "Sicilian Defense - Najdorf",
        eco: "B90",
        moves: &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "a6"],
        side: Side::Black,
        description: "Sharp and aggressive defense, popular at all levels.",
        difficulty: Difficulty::Advanced,
    },
    SeedOpening {
        name: "Queen's Gambit Declined",
        eco: "D30",
        moves: &["d4", "d5", "c4", "e6", "Nf3", "Nf6", "Bg5", "Be7", "e3", "O-O"],
        side: Side::Black,
        description: "Solid and classical response to the Queen's Gambit.",
        difficulty: Difficulty::Intermediate,
    },
    SeedOpening {
        name: "Ruy Lopez - Berlin Defense",
        eco: "C67",
        moves: &["e4", "e5", "Nf3", "Nc6", "Bb5", "Nf6", "O-O", "Nxe4", "d4", "Nd6"],
        side: Side::Black,
        description: "Modern defensive system, very solid and reliable.",
        difficulty: Difficulty::Intermediate,
    },
    SeedOpening {
        name: "King's Indian Defense",
        eco: "E60",
        moves: &["d4", "Nf6", "c4", "g6", "Nc3", "Bg7", "e4", "d6", "Nf3", "O-O"],
        side: Side::Black,
        description: "Hypermodern opening with counterattacking chances.",
        difficulty: Difficulty::Intermediate,
    },
    SeedOpening {
        name: "London System",
        eco: "D02",
        moves: &["d4", "d5", "Nf3", "Nf6", "Bf4", "c5", "e3", "Nc6", "c3", "Qb6"],
        side: Side::White,
        description: "Flexible and easy-to-learn system for White.",
        difficulty: Difficulty::Beginner,
    },
    SeedOpening {
        name: "French Defense - Winawer",
        eco: "C15",
        moves: &["e4", "e6", "d4", "d5", "Nc3", "Bb4", "e5", "c5", "a3", "Bxc3+"],
        side: Side::Black,
        description: "Sharp tactical variation of the French Defense.",
        difficulty: Difficulty::Advanced,
    },
    SeedOpening {
        name: "Caro-Kann Defense",
        eco: "B10",
        moves: &["e4", "c6", "d4", "d5", "Nc3", "dxe4", "Nxe4", "Bf5", "Ng3", "Bg6"],
        side: Side::Black,
        description: "Solid defense with good pawn structure.",
        difficulty: Difficulty::Beginner,
    },
];

/// Insert the built-in openings into an empty catalogue.
///
/// Returns how many were inserted; 0 when any opening already exists.
pub async fn seed_builtin(db: &Database) -> Result<usize> {
    if db.count_openings().await? > 0 {
        return Ok(0);
    }

    for seed in BUILTIN_OPENINGS {
        let opening = Opening {
            id: Uuid::new_v4(),
            name: seed.name.to_string(),
            eco: seed.eco.to_string(),
            moves: seed.moves.iter().map(|m| m.to_string()).collect(),
            side: seed.side,
            description: seed.description.to_string(),
            difficulty: seed.difficulty,
            owner_id: None,
        };
        db.insert_opening(&opening).await?;
    }

    tracing::info!("Seeded {} built-in openings", BUILTIN_OPENINGS.len());

    Ok(BUILTIN_OPENINGS.len())
}

/// Every opening with its lines and the user's progress on each.
pub async fn overview(db: &Database, user_id: Uuid) -> Result<Vec<OpeningOverview>> {
    let openings = db.list_openings().await?;

    let mut lines_by_opening: HashMap<Uuid, Vec<Line>> = HashMap::new();
    for row in db.list_lines().await? {
        let line = row.to_core()?;
        lines_by_opening.entry(line.opening_id).or_default().push(line);
    }

    let mut progress_by_item: HashMap<TrackableItem, ProgressState> = HashMap::new();
    for row in db.progress_for_user(user_id).await? {
        progress_by_item.insert(row.item(), row.to_core_state()?);
    }

    let mut result = Vec::with_capacity(openings.len());
    for row in openings {
        let opening = row.to_core()?;
        let main_line = progress_by_item.get(&TrackableItem::main_line(user_id, opening.id));

        let mut lines = lines_by_opening.remove(&opening.id).unwrap_or_default();
        lines.sort_by_key(|line| line.order);
        let lines = lines
            .into_iter()
            .map(|line| {
                let progress = progress_by_item.get(&TrackableItem::variation(
                    user_id,
                    opening.id,
                    line.id,
                ));
                LineOverview {
                    is_active: progress.map(|p| p.is_active).unwrap_or(false),
                    current_move_index: progress.map(|p| p.current_move_index).unwrap_or(0),
                    total_moves: line.moves.len(),
                    line,
                }
            })
            .collect();

        result.push(OpeningOverview {
            is_active: main_line.map(|p| p.is_active).unwrap_or(false),
            current_move_index: main_line.map(|p| p.current_move_index).unwrap_or(0),
            total_moves: opening.moves.len(),
            next_review_date: main_line.map(|p| p.next_review_date),
            is_user_created: opening.owner_id == Some(user_id),
            lines,
            opening,
        });
    }

    Ok(result)
}

/// One opening with its lines in display order.
pub async fn detail(db: &Database, opening_id: Uuid) -> Result<OpeningDetail> {
    let opening = db
        .get_opening(opening_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Opening {} not found", opening_id)))?
        .to_core()?;

    let lines = db
        .lines_for_opening(opening_id)
        .await?
        .iter()
        .map(DbLine::to_core)
        .collect::<Result<Vec<_>>>()?;

    Ok(OpeningDetail { opening, lines })
}

/// The opening behind an item and, for a variation, the line itself.
///
/// Fails with NotFound when either is missing or the line belongs to a
/// different opening.
pub async fn resolve_sequence(
    db: &Database,
    item: &TrackableItem,
) -> Result<(Opening, Option<Line>)> {
    let opening = db
        .get_opening(item.opening_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Opening {} not found", item.opening_id)))?
        .to_core()?;

    let line = match item.line {
        LineRef::MainLine => None,
        LineRef::Variation(line_id) => {
            let line = db
                .get_line(line_id)
                .await?
                .filter(|line| line.opening_id == item.opening_id)
                .ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "Line {} not found in opening {}",
                        line_id, item.opening_id
                    ))
                })?
                .to_core()?;
            Some(line)
        }
    };

    Ok((opening, line))
}
