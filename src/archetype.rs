//! The catalogue of dog breeds that appear on the field, and the boss looks built on top of them.

use rand::seq::IndexedRandom;
use rand::Rng;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::constants::spawn::VARIETY_START;

/// Elapsed time after which every breed can appear.
const FULL_POOL_START: f32 = 20.0;

/// Encounter categories recorded in the collection log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Weird,
    Big,
    Chi,
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EarShape {
    Triangle,
    Drop,
    Puff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TailShape {
    Fluffy,
    Long,
    Stub,
    Curl,
    Puff,
    Thin,
    Flame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceShape {
    Smile,
    Tongue,
    Pug,
}

/// Packed 0xRRGGBB colors used when drawing a dog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    pub body: u32,
    pub ear: u32,
    pub accent: u32,
}

/// Everything a renderer needs to draw one dog silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Appearance {
    pub palette: Palette,
    pub ear: EarShape,
    pub tail: TailShape,
    pub face: FaceShape,
    pub short_legs: bool,
    pub long_body: bool,
    pub light_eyes: bool,
}

impl Appearance {
    const fn new(palette: Palette, ear: EarShape, tail: TailShape, face: FaceShape) -> Self {
        Self {
            palette,
            ear,
            tail,
            face,
            short_legs: false,
            long_body: false,
            light_eyes: false,
        }
    }
}

const fn palette(body: u32, ear: u32, accent: u32) -> Palette {
    Palette { body, ear, accent }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Breed {
    Pomeranian,
    Samoyed,
    Retriever,
    Corgi,
    Pug,
    Dachshund,
    Poodle,
    WhiteChihuahua,
    BlackChihuahua,
}

impl Breed {
    /// Pool used before variety opens up.
    const EARLY: [Breed; 3] = [Breed::Pomeranian, Breed::WhiteChihuahua, Breed::Samoyed];
    const MIDDLE: [Breed; 5] = [
        Breed::Pomeranian,
        Breed::WhiteChihuahua,
        Breed::Retriever,
        Breed::Corgi,
        Breed::Pug,
    ];
    const ALL: [Breed; 9] = [
        Breed::Pomeranian,
        Breed::Samoyed,
        Breed::Retriever,
        Breed::Corgi,
        Breed::Pug,
        Breed::Dachshund,
        Breed::Poodle,
        Breed::WhiteChihuahua,
        Breed::BlackChihuahua,
    ];

    pub fn category(self) -> Category {
        match self {
            Breed::Pomeranian | Breed::Corgi | Breed::Dachshund => Category::Weird,
            Breed::Samoyed | Breed::Retriever => Category::Big,
            Breed::Pug | Breed::WhiteChihuahua | Breed::BlackChihuahua => Category::Chi,
            Breed::Poodle => Category::Friend,
        }
    }

    pub fn appearance(self) -> Appearance {
        use EarShape as E;
        use FaceShape as F;
        use TailShape as T;

        match self {
            Breed::Pomeranian => Appearance::new(palette(0xf7e6c8, 0xd7b58b, 0xf1d7aa), E::Triangle, T::Fluffy, F::Smile),
            Breed::Samoyed => Appearance::new(palette(0xffffff, 0xe8e8e8, 0xf5f5f5), E::Triangle, T::Fluffy, F::Smile),
            Breed::Retriever => Appearance::new(palette(0xf0c27a, 0xc8894a, 0xf6d39a), E::Drop, T::Long, F::Tongue),
            Breed::Corgi => Appearance {
                short_legs: true,
                ..Appearance::new(palette(0xf2a65a, 0xd07d3d, 0xffffff), E::Triangle, T::Stub, F::Smile)
            },
            Breed::Pug => Appearance::new(palette(0xf2d2a1, 0x3a2f2a, 0x3a2f2a), E::Drop, T::Curl, F::Pug),
            Breed::Dachshund => Appearance {
                long_body: true,
                ..Appearance::new(palette(0xb07a44, 0x6b4526, 0xd1b08a), E::Drop, T::Long, F::Smile)
            },
            Breed::Poodle => Appearance::new(palette(0xcaa27c, 0xb18361, 0xe4c7aa), E::Puff, T::Puff, F::Smile),
            Breed::WhiteChihuahua => Appearance::new(palette(0xfff7ef, 0xd9b7a0, 0xfff7ef), E::Triangle, T::Thin, F::Smile),
            Breed::BlackChihuahua => Appearance {
                light_eyes: true,
                ..Appearance::new(palette(0x2b2b2b, 0x1a1a1a, 0xf4d3b3), E::Triangle, T::Thin, F::Smile)
            },
        }
    }

    /// Breeds eligible to spawn at the given elapsed run time.
    pub fn pool(elapsed: f32) -> &'static [Breed] {
        if elapsed < VARIETY_START {
            &Self::EARLY
        } else if elapsed < FULL_POOL_START {
            &Self::MIDDLE
        } else {
            &Self::ALL
        }
    }

    /// Picks a breed uniformly from the pool for the given elapsed time.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R, elapsed: f32) -> Breed {
        // Pools are never empty.
        *Self::pool(elapsed).choose(rng).unwrap_or(&Breed::Pomeranian)
    }
}

/// The visual identity of a boss once it is on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossLook {
    /// An oversized ordinary dog.
    Dog(Breed),
    Statue,
    Cerberus { heads: u8 },
}

impl BossLook {
    pub fn category(self) -> Category {
        match self {
            BossLook::Dog(breed) => breed.category(),
            BossLook::Statue | BossLook::Cerberus { .. } => Category::Weird,
        }
    }

    pub fn appearance(self) -> Appearance {
        match self {
            BossLook::Dog(breed) => breed.appearance(),
            BossLook::Statue => Appearance::new(
                palette(0xbfc6cf, 0x9aa3ad, 0xd6dde6),
                EarShape::Triangle,
                TailShape::Stub,
                FaceShape::Smile,
            ),
            BossLook::Cerberus { .. } => Appearance::new(
                palette(0x2b2b2b, 0x1f1f1f, 0xff7b2e),
                EarShape::Triangle,
                TailShape::Flame,
                FaceShape::Smile,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_breed_in_full_pool() {
        for breed in Breed::iter() {
            assert!(Breed::pool(60.0).contains(&breed), "{breed} missing from full pool");
        }
    }

    #[test]
    fn test_breed_names() {
        assert_eq!(Breed::WhiteChihuahua.to_string(), "white_chihuahua");
        assert_eq!(Category::Chi.as_ref(), "chi");
    }
}
