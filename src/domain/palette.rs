//! Color assignment for newly shelved books
//!
//! A picker is consulted exactly once per book, when it is added to the
//! shelf. The chosen color is stored on the [`BookRecord`](super::book::BookRecord),
//! so the layout engine never touches randomness.

use rand::Rng;

use crate::domain::book::Rgb;

/// Curated spine colors used when no palette is configured
pub const DEFAULT_PALETTE: [Rgb; 10] = [
    Rgb::new(0x8c, 0x4a, 0x2f), // oxblood
    Rgb::new(0x2f, 0x4b, 0x7c), // navy
    Rgb::new(0x3e, 0x6b, 0x48), // forest
    Rgb::new(0xc9, 0x8b, 0x2b), // ochre
    Rgb::new(0x6d, 0x3b, 0x6e), // plum
    Rgb::new(0xd9, 0xc5, 0xa0), // parchment
    Rgb::new(0x4f, 0x8a, 0x8b), // teal
    Rgb::new(0xb5, 0x4a, 0x4a), // brick
    Rgb::new(0x55, 0x55, 0x5f), // slate
    Rgb::new(0xe0, 0x9f, 0x9f), // rose
];

/// Source of colors for books entering the shelf
pub trait ColorPicker {
    fn pick(&mut self) -> Rgb;
}

impl<P: ColorPicker + ?Sized> ColorPicker for Box<P> {
    fn pick(&mut self) -> Rgb {
        (**self).pick()
    }
}

/// Uniform choice over a fixed palette
#[derive(Debug, Clone)]
pub struct PalettePicker<R: Rng> {
    palette: Vec<Rgb>,
    rng: R,
}

impl<R: Rng> PalettePicker<R> {
    /// Creates a picker; an empty palette falls back to [`DEFAULT_PALETTE`]
    pub fn new(palette: Vec<Rgb>, rng: R) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.to_vec()
        } else {
            palette
        };
        Self { palette, rng }
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }
}

impl<R: Rng> ColorPicker for PalettePicker<R> {
    fn pick(&mut self) -> Rgb {
        let index = self.rng.gen_range(0..self.palette.len());
        self.palette[index]
    }
}

/// Uniform choice over the whole RGB cube
#[derive(Debug, Clone)]
pub struct RandomRgbPicker<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomRgbPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ColorPicker for RandomRgbPicker<R> {
    fn pick(&mut self) -> Rgb {
        Rgb::new(
            self.rng.gen_range(0..=u8::MAX),
            self.rng.gen_range(0..=u8::MAX),
            self.rng.gen_range(0..=u8::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn palette_picks_stay_in_palette() {
        let palette = vec![Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)];
        let mut picker = PalettePicker::new(palette.clone(), StdRng::seed_from_u64(7));

        for _ in 0..50 {
            assert!(palette.contains(&picker.pick()));
        }
    }

    #[test]
    fn empty_palette_uses_default() {
        let picker = PalettePicker::new(Vec::new(), StdRng::seed_from_u64(7));
        assert_eq!(picker.palette(), &DEFAULT_PALETTE[..]);
    }

    #[test]
    fn seeded_pickers_are_reproducible() {
        let mut first = RandomRgbPicker::new(StdRng::seed_from_u64(42));
        let mut second = RandomRgbPicker::new(StdRng::seed_from_u64(42));

        let a: Vec<Rgb> = (0..8).map(|_| first.pick()).collect();
        let b: Vec<Rgb> = (0..8).map(|_| second.pick()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn boxed_pickers_delegate() {
        let mut boxed: Box<dyn ColorPicker> =
            Box::new(PalettePicker::new(vec![Rgb::new(5, 5, 5)], StdRng::seed_from_u64(1)));
        assert_eq!(boxed.pick(), Rgb::new(5, 5, 5));
    }

    #[test]
    fn palette_covers_every_entry_eventually() {
        let mut picker = PalettePicker::new(DEFAULT_PALETTE.to_vec(), StdRng::seed_from_u64(3));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(picker.pick());
        }
        assert_eq!(seen.len(), DEFAULT_PALETTE.len());
    }
}
