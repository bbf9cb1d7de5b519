use std::fs::File;
use std::io::Read;
use std::path::Path;

use alchemy_core::{normalize_word, AchievementKind};
use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::{info, warn};

use crate::repositories::{AchievementRepository, ImageRepository, NewAchievement, WordRepository};

pub const COMBINATIONS_FILE: &str = "combinations.csv";
pub const ACHIEVEMENTS_FILE: &str = "achievements.csv";

#[derive(Debug, Deserialize)]
struct CombinationRow {
    a: String,
    b: String,
    result: String,
}

#[derive(Debug, Deserialize)]
struct AchievementRow {
    title: String,
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(default)]
    description: String,
    image: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub images: usize,
    pub combinations: usize,
    pub achievements: usize,
}

/// One-shot ingestion of images, combinations and achievements.
pub async fn seed_all(
    db: &DatabaseConnection,
    icons_dir: &Path,
    seed_dir: &Path,
) -> Result<SeedSummary> {
    let words = WordRepository::new(db.clone());
    words.ensure_primitives().await?;

    let images = seed_images(&ImageRepository::new(db.clone()), icons_dir).await?;

    let combinations = match open_optional(&seed_dir.join(COMBINATIONS_FILE))? {
        Some(file) => seed_combinations(&words, file).await?,
        None => 0,
    };

    let achievements = match open_optional(&seed_dir.join(ACHIEVEMENTS_FILE))? {
        Some(file) => {
            seed_achievements(
                &AchievementRepository::new(db.clone()),
                &ImageRepository::new(db.clone()),
                file,
            )
            .await?
        }
        None => 0,
    };

    let summary = SeedSummary {
        images,
        combinations,
        achievements,
    };
    info!(?summary, "Seeding finished");
    Ok(summary)
}

fn open_optional(path: &Path) -> Result<Option<File>> {
    if !path.exists() {
        warn!(path = %path.display(), "Seed file missing, skipping");
        return Ok(None);
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Some(file))
}

/// Registers every file in `dir` as a player image.
pub async fn seed_images(images: &ImageRepository, dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Image directory missing, skipping");
        return Ok(0);
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let mut added = 0;
    for name in &names {
        if images.add(name).await? {
            added += 1;
        }
    }
    Ok(added)
}

/// Feeds `a,b,result` rows through the learning path, in file order.
pub async fn seed_combinations<R: Read>(words: &WordRepository, reader: R) -> Result<usize> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut learned = 0;
    for (line, row) in csv_reader.deserialize::<CombinationRow>().enumerate() {
        let row = row.with_context(|| format!("combination row {}", line + 1))?;
        let parsed = normalize_word(&row.a)
            .and_then(|a| Ok((a, normalize_word(&row.b)?, normalize_word(&row.result)?)));
        match parsed {
            Ok((a, b, result)) => {
                if words.add_combination(&a, &b, &result).await? {
                    learned += 1;
                }
            }
            Err(error) => warn!(line = line + 1, %error, "Skipping combination"),
        }
    }
    Ok(learned)
}

/// Loads `title,type,value,description,image` rows.
pub async fn seed_achievements<R: Read>(
    achievements: &AchievementRepository,
    images: &ImageRepository,
    reader: R,
) -> Result<usize> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut loaded = 0;
    for (line, row) in csv_reader.deserialize::<AchievementRow>().enumerate() {
        let row = row.with_context(|| format!("achievement row {}", line + 1))?;
        let kind = match row.kind.parse::<AchievementKind>() {
            Ok(kind) => kind,
            Err(error) => {
                warn!(line = line + 1, %error, "Skipping achievement");
                continue;
            }
        };
        if kind != AchievementKind::TargetWord && row.value.parse::<i32>().is_err() {
            warn!(line = line + 1, value = %row.value, "Skipping achievement with non-numeric value");
            continue;
        }

        images.add_achievement_image(&row.image).await?;
        achievements
            .upsert(NewAchievement {
                title: row.title,
                kind,
                value: row.value.to_lowercase(),
                description: row.description,
                image_name: row.image,
            })
            .await?;
        loaded += 1;
    }
    Ok(loaded)
}
