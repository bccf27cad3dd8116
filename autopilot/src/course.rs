use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::rng::SeededRng;

/// First hazard never starts before this, so every course has a run-up.
const RUN_UP: u32 = 240;
const GAP_MIN: u32 = 180;
const GAP_MAX: u32 = 420;
const WIDTH_MIN: u32 = 10;
const WIDTH_MAX: u32 = 45;
/// Clear stretch left between the last hazard and the finish line.
const RUN_OUT: f32 = 100.0;
/// Past this, whole-unit gaps stop being exact in `f32` and the layout loop
/// could stall.
pub const MAX_GENERATED_LENGTH: f32 = 1_000_000.0;

/// Ground stretch that kills a grounded player anywhere in `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub start: f32,
    pub end: f32,
}

impl Hazard {
    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.start && x <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub length: f32,
    pub hazards: Vec<Hazard>,
}

impl Course {
    pub fn new(id: impl Into<String>, length: f32, mut hazards: Vec<Hazard>) -> Result<Self> {
        hazards.sort_by(|a, b| a.start.total_cmp(&b.start));
        let course = Self {
            id: id.into(),
            length,
            hazards,
        };
        course.validate()?;
        Ok(course)
    }

    pub fn generate(seed: u32, length: f32) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 || length > MAX_GENERATED_LENGTH {
            return Err(anyhow!(
                "generated course length must be in (0, {MAX_GENERATED_LENGTH}], got {length}"
            ));
        }
        let mut rng = SeededRng::new(seed);
        let mut hazards = Vec::new();
        let mut cursor = RUN_UP as f32 + rng.next_span(0, GAP_MIN);
        loop {
            let width = rng.next_span(WIDTH_MIN, WIDTH_MAX);
            if cursor + width > length - RUN_OUT {
                break;
            }
            hazards.push(Hazard {
                start: cursor,
                end: cursor + width,
            });
            cursor += width + rng.next_span(GAP_MIN, GAP_MAX);
        }
        Ok(Self {
            id: format!("seeded-{seed:08x}"),
            length,
            hazards,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading course {}", path.display()))?;
        let course: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing course {}", path.display()))?;
        Self::new(course.id, course.length, course.hazards)
            .with_context(|| format!("invalid course {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("failed writing {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(anyhow!("course length must be > 0, got {}", self.length));
        }
        let mut prev_end = 0.0f32;
        for (i, hazard) in self.hazards.iter().enumerate() {
            if !(hazard.start.is_finite() && hazard.end.is_finite()) {
                return Err(anyhow!("hazard {i} has a non-finite bound"));
            }
            if hazard.start <= 0.0 || hazard.end < hazard.start {
                return Err(anyhow!(
                    "hazard {i} must satisfy 0 < start <= end, got [{}, {}]",
                    hazard.start,
                    hazard.end
                ));
            }
            if i > 0 && hazard.start <= prev_end {
                return Err(anyhow!("hazard {i} overlaps the previous one"));
            }
            if hazard.end >= self.length {
                return Err(anyhow!("hazard {i} runs past the finish line"));
            }
            prev_end = hazard.end;
        }
        Ok(())
    }

    pub fn hazard_at(&self, x: f32) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| hazard.contains(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_courses_are_valid_and_reproducible() {
        for seed in [1u32, 0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678] {
            let a = Course::generate(seed, 4_000.0).unwrap();
            let b = Course::generate(seed, 4_000.0).unwrap();
            assert_eq!(a, b);
            a.validate().unwrap();
            assert!(!a.hazards.is_empty(), "seed={seed:#x}");
            assert!(a.hazards[0].start >= RUN_UP as f32);
        }
    }

    #[test]
    fn new_sorts_and_validates() {
        let course = Course::new(
            "two",
            500.0,
            vec![
                Hazard {
                    start: 300.0,
                    end: 320.0,
                },
                Hazard {
                    start: 100.0,
                    end: 110.0,
                },
            ],
        )
        .unwrap();
        assert_eq!(course.hazards[0].start, 100.0);
        assert!(course.hazard_at(105.0).is_some());
        assert!(course.hazard_at(200.0).is_none());

        let overlapping = Course::new(
            "bad",
            500.0,
            vec![
                Hazard {
                    start: 100.0,
                    end: 150.0,
                },
                Hazard {
                    start: 140.0,
                    end: 160.0,
                },
            ],
        );
        assert!(overlapping.is_err());
        assert!(Course::new("empty", 0.0, Vec::new()).is_err());
    }

    #[test]
    fn generate_rejects_unusable_lengths() {
        for length in [f32::NAN, f32::INFINITY, 0.0, -50.0, 1.0e12] {
            assert!(Course::generate(7, length).is_err(), "length={length}");
        }
        let tiny = Course::generate(7, 50.0).unwrap();
        assert!(tiny.hazards.is_empty());
    }

    #[test]
    fn load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.json");
        let course = Course::generate(42, 2_000.0).unwrap();
        course.write(&path).unwrap();
        assert_eq!(Course::load(&path).unwrap(), course);
    }
}
