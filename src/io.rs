//! Output of decompositions
use crate::decomposition::Decomposition;
use crate::field::{Field, FieldLength};
use crate::types::{Error, Result};
use std::fs;

// Cell type of a single point in the VTK legacy format
const VTK_VERTEX: usize = 1;

pub trait VtkIO {
    //! Point cloud I/O in the legacy VTK format

    /// Generate the VTK string for the owned points with the given point data
    fn to_vtk_string(&self, fields: &[&Field]) -> Result<String>;

    /// Name of the file written by this process for `stem`
    fn vtk_filename(&self, stem: &str) -> String;

    /// Export as VTK
    fn export_as_vtk(&self, stem: &str, fields: &[&Field]) -> Result<()> {
        let vtk_s = self.to_vtk_string(fields)?;
        fs::write(self.vtk_filename(stem), vtk_s)?;
        Ok(())
    }
}

impl VtkIO for Decomposition {
    fn to_vtk_string(&self, fields: &[&Field]) -> Result<String> {
        let point_count = self.owned_count();
        for field in fields {
            if field.len() < point_count {
                return Err(Error::InvalidConfiguration(format!(
                    "Field {} has {} points, {point_count} needed",
                    field.spec(),
                    field.len()
                )));
            }
        }

        let mut vtk_s = String::from("");
        vtk_s.push_str("# vtk DataFile Version 3.0\n");
        vtk_s.push_str(&format!(
            "peridecomp rank {} of {}\n",
            self.rank(),
            self.num_procs()
        ));
        vtk_s.push_str("ASCII\n");
        vtk_s.push_str("DATASET UNSTRUCTURED_GRID\n");

        vtk_s.push_str(&format!("POINTS {point_count} double\n"));
        for x in self.owned_coordinates().chunks_exact(3) {
            vtk_s.push_str(&format!("{} {} {}\n", x[0], x[1], x[2]));
        }

        vtk_s.push_str(&format!("CELLS {point_count} {}\n", 2 * point_count));
        for i in 0..point_count {
            vtk_s.push_str(&format!("1 {i}\n"));
        }
        vtk_s.push_str(&format!("CELL_TYPES {point_count}\n"));
        for _ in 0..point_count {
            vtk_s.push_str(&format!("{VTK_VERTEX}\n"));
        }

        vtk_s.push_str(&format!("POINT_DATA {point_count}\n"));
        vtk_s.push_str("SCALARS volume double 1\n");
        vtk_s.push_str("LOOKUP_TABLE default\n");
        for v in &self.volumes()[..point_count] {
            vtk_s.push_str(&format!("{v}\n"));
        }

        for field in fields {
            let label = sanitize(field.spec().label());
            match field.spec().length() {
                FieldLength::Scalar => {
                    vtk_s.push_str(&format!("SCALARS {label} double 1\n"));
                    vtk_s.push_str("LOOKUP_TABLE default\n");
                }
                FieldLength::Vector3d => {
                    vtk_s.push_str(&format!("VECTORS {label} double\n"));
                }
            }
            for i in 0..point_count {
                for (n, v) in field.point(i).iter().enumerate() {
                    if n != 0 {
                        vtk_s.push(' ');
                    }
                    vtk_s.push_str(&format!("{v}"));
                }
                vtk_s.push('\n');
            }
        }

        Ok(vtk_s)
    }

    fn vtk_filename(&self, stem: &str) -> String {
        if self.num_procs() == 1 {
            format!("{stem}.vtk")
        } else {
            format!("{stem}.{}.vtk", self.rank())
        }
    }
}

/// Array names in VTK files cannot contain whitespace
fn sanitize(label: &str) -> String {
    let label = label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>();
    if label.is_empty() {
        String::from("field")
    } else {
        label
    }
}

#[cfg(test)]
mod test {
    use super::{sanitize, VtkIO};
    use crate::comm::LocalCommunicator;
    use crate::decomposition::{Decomposition, DecompositionOptions};
    use crate::field::{Field, FieldKind, FieldLength, FieldSpec};
    use crate::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
    use crate::types::Error;

    fn line(num_procs: usize) -> TensorProductGenerator {
        let single = Spec1D::new(1, 0.0, 1.0);
        TensorProductGenerator::new(
            num_procs,
            [Spec1D::new(4, 0.0, 4.0), single, single],
            DomainShape::Box,
        )
        .unwrap()
    }

    #[test]
    fn test_vtk_string() {
        let d = Decomposition::serial(&line(1), 1.0).unwrap();
        let mut force = Field::new(
            FieldSpec::new(FieldKind::Force, FieldLength::Vector3d, "body force"),
            d.owned_count(),
        );
        force.point_mut(3)[2] = -0.5;
        let vtk = d.to_vtk_string(&[&force]).unwrap();
        let lines = vtk.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "# vtk DataFile Version 3.0");
        assert_eq!(lines[3], "DATASET UNSTRUCTURED_GRID");
        assert_eq!(lines[4], "POINTS 4 double");
        assert_eq!(lines[5], "0.5 0.5 0.5");
        assert_eq!(lines[9], "CELLS 4 8");
        assert_eq!(lines[10], "1 0");
        assert!(vtk.contains("CELL_TYPES 4\n1\n1\n1\n1\n"));
        assert!(vtk.contains("POINT_DATA 4\nSCALARS volume double 1\nLOOKUP_TABLE default\n1\n"));
        assert!(vtk.contains("VECTORS body_force double\n"));
        assert_eq!(lines[lines.len() - 1], "0 0 -0.5");
    }

    #[test]
    fn test_short_field_is_rejected() {
        let d = Decomposition::serial(&line(1), 1.0).unwrap();
        let short = Field::new(
            FieldSpec::new(FieldKind::Displacement, FieldLength::Vector3d, "u"),
            2,
        );
        assert!(matches!(
            d.to_vtk_string(&[&short]),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_filenames() {
        let d = Decomposition::serial(&line(1), 1.0).unwrap();
        assert_eq!(d.vtk_filename("out"), "out.vtk");

        let generator = line(2);
        let names = LocalCommunicator::run(2, |comm| {
            Decomposition::new(&generator, 1.0, &DecompositionOptions::default(), comm)
                .unwrap()
                .vtk_filename("out")
        });
        assert_eq!(names, vec!["out.0.vtk", "out.1.vtk"]);
    }

    #[test]
    fn test_export() {
        let d = Decomposition::serial(&line(1), 1.0).unwrap();
        let stem = std::env::temp_dir().join("_test_io_line");
        let stem = stem.to_string_lossy();
        d.export_as_vtk(&stem, &[]).unwrap();
        let written = std::fs::read_to_string(format!("{stem}.vtk")).unwrap();
        assert_eq!(written, d.to_vtk_string(&[]).unwrap());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("f N+1"), "f_N+1");
        assert_eq!(sanitize(""), "field");
    }
}
