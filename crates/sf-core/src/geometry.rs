//! Plain value types for placing things on the canvas.

use crate::{CoreResult, Real, ensure_finite};

/// 2D coordinate in diagram space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn ensure_finite(&self) -> CoreResult<()> {
        ensure_finite(self.x, "point x")?;
        ensure_finite(self.y, "point y")?;
        Ok(())
    }
}

/// Placement of a component instance.
///
/// Always fully populated. Partial updates go through [`TransformPatch`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Transform {
    pub x: Real,
    pub y: Real,
    /// Rotation in degrees.
    pub rot: Real,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        rot: 0.0,
        flip_h: false,
        flip_v: false,
    };

    pub fn at(x: Real, y: Real) -> Self {
        Self {
            x,
            y,
            ..Self::IDENTITY
        }
    }

    /// Shallow merge: every field set in `patch` replaces the current value.
    pub fn merged(&self, patch: &TransformPatch) -> Transform {
        Transform {
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            rot: patch.rot.unwrap_or(self.rot),
            flip_h: patch.flip_h.unwrap_or(self.flip_h),
            flip_v: patch.flip_v.unwrap_or(self.flip_v),
        }
    }

    /// Rejects NaN or infinite position and rotation.
    pub fn ensure_finite(&self) -> CoreResult<()> {
        ensure_finite(self.x, "x")?;
        ensure_finite(self.y, "y")?;
        ensure_finite(self.rot, "rot")?;
        Ok(())
    }
}

/// A partially specified [`Transform`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TransformPatch {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub x: Option<Real>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub y: Option<Real>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rot: Option<Real>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub flip_h: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub flip_v: Option<bool>,
}

impl TransformPatch {
    pub fn position(x: Real, y: Real) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject NaN or infinite coordinates and rotation.
    pub fn ensure_finite(&self) -> CoreResult<()> {
        for (value, what) in [(self.x, "x"), (self.y, "y"), (self.rot, "rot")] {
            if let Some(v) = value {
                ensure_finite(v, what)?;
            }
        }
        Ok(())
    }

    /// Fill the unset fields from the identity transform.
    pub fn resolve(&self) -> Transform {
        Transform::IDENTITY.merged(self)
    }
}

impl From<Transform> for TransformPatch {
    fn from(t: Transform) -> Self {
        Self {
            x: Some(t.x),
            y: Some(t.y),
            rot: Some(t.rot),
            flip_h: Some(t.flip_h),
            flip_v: Some(t.flip_v),
        }
    }
}
