//! Domain shapes used to filter candidate points

use crate::types::{distance_squared, Axis, Error, Result};

/// Which cell centres of the tensor product grid belong to the domain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DomainShape {
    /// Keep every point
    #[default]
    Box,
    /// Keep points whose Euclidean distance from `center` is at most `radius`
    Sphere {
        /// Centre of the sphere
        center: [f64; 3],
        /// Radius of the sphere
        radius: f64,
    },
    /// Keep points whose distance from the line through `center` along `axis` is at most `radius`
    Cylinder {
        /// A point on the cylinder axis
        center: [f64; 3],
        /// Radius of the cylinder
        radius: f64,
        /// Direction of the cylinder axis
        axis: Axis,
    },
}

impl DomainShape {
    /// Does the domain contain the point `x`?
    pub fn contains(&self, x: &[f64; 3]) -> bool {
        match self {
            DomainShape::Box => true,
            DomainShape::Sphere { center, radius } => {
                distance_squared(x, center) <= radius * radius
            }
            DomainShape::Cylinder {
                center,
                radius,
                axis,
            } => {
                let mut projected = *x;
                projected[axis.index()] = center[axis.index()];
                distance_squared(&projected, center) <= radius * radius
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            DomainShape::Box => Ok(()),
            DomainShape::Sphere { center, radius } | DomainShape::Cylinder { center, radius, .. } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    Err(Error::InvalidConfiguration(format!(
                        "Domain radius must be positive, got {radius}"
                    )))
                } else if center.iter().any(|c| !c.is_finite()) {
                    Err(Error::InvalidConfiguration(format!(
                        "Domain centre must be finite, got {center:?}"
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::DomainShape;
    use crate::types::Axis;

    #[test]
    fn test_sphere() {
        let sphere = DomainShape::Sphere {
            center: [0.0, 0.0, 0.0],
            radius: 1.0,
        };
        assert!(sphere.contains(&[0.0, 0.0, 0.0]));
        assert!(sphere.contains(&[1.0, 0.0, 0.0]));
        assert!(!sphere.contains(&[0.8, 0.8, 0.0]));
    }

    #[test]
    fn test_cylinder_ignores_axis_coordinate() {
        let cylinder = DomainShape::Cylinder {
            center: [1.0, 1.0, 0.0],
            radius: 0.5,
            axis: Axis::Z,
        };
        assert!(cylinder.contains(&[1.0, 1.0, 100.0]));
        assert!(cylinder.contains(&[1.3, 1.3, -5.0]));
        assert!(!cylinder.contains(&[1.6, 1.0, 0.0]));
    }

    #[test]
    fn test_validation() {
        assert!(DomainShape::Box.validate().is_ok());
        assert!(DomainShape::Sphere {
            center: [0.0; 3],
            radius: 0.0
        }
        .validate()
        .is_err());
        assert!(DomainShape::Cylinder {
            center: [f64::NAN, 0.0, 0.0],
            radius: 1.0,
            axis: Axis::X
        }
        .validate()
        .is_err());
    }
}
