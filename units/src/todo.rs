/// Units which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// The ray tracer's inner loop works on plain `f32`s (millimetres for lengths),
/// so these aliases exist to leave some clues in the source as to what the
/// numbers represent.

pub type Lengthf32    = f32;
pub type Anglef32     = f32;
pub type Weightf32    = f32;
pub type Ratiof32     = f32;
pub type Intensityf32 = f32; // TODO uom Intensity, once images carry attenuation units
