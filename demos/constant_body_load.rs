//! A slender bar under its own weight, fixed at the top
use peridecomp::field::{Field, FieldKind, FieldLength, FieldSpec};
use peridecomp::io::VtkIO;
use peridecomp::loading::{BodyLoad, DirichletBc, Loader, StageFunction};
use peridecomp::quick_grid::{DomainShape, Spec1D, TensorProductGenerator};
use peridecomp::selection::points_axis_aligned_maximum;
use peridecomp::{Axis, Decomposition};

fn main() -> peridecomp::Result<()> {
    let (nx, lx, lz) = (5, 1.0, 10.0);
    let nz = (lz * nx as f64 / lx) as usize;
    let x = Spec1D::new(nx, -lx / 2.0 / nx as f64, lx);
    let z = Spec1D::new(nz, -lz / 2.0 / nz as f64, lz);
    let horizon = 1.5 * (2.0 * x.cell_size().powi(2) + z.cell_size().powi(2)).sqrt();
    let (g, rho) = (9.807e-3, 7800e-6);

    let generator = TensorProductGenerator::new(1, [x, x, z], DomainShape::Box)?;
    let d = Decomposition::serial(&generator, horizon)?;
    let n = d.owned_count();

    let mut f_n = Field::new(FieldSpec::new(FieldKind::Force, FieldLength::Vector3d, "fN"), n);
    let mut f_np1 = Field::new(
        FieldSpec::new(FieldKind::Force, FieldLength::Vector3d, "fNP1"),
        n,
    );

    let fixed = points_axis_aligned_maximum(Axis::Z, d.owned_coordinates(), horizon);
    let bc = DirichletBc::all_components_fixed(fixed);
    let body = BodyLoad::new([0.0, 0.0, -1.0], (0..n).collect(), StageFunction::new(0.0, g * rho))?;
    body.compute_owned_external_force(1.0, &mut f_n)?;
    body.compute_owned_external_force(1.0, &mut f_np1)?;
    bc.apply_homogeneous_form(&mut f_np1)?;

    println!(
        "{n} points, {} neighbour entries, {} constrained points",
        d.neighbour_count_total(),
        bc.point_ids().len()
    );
    d.export_as_vtk("constant_body_load", &[&f_n, &f_np1])
}
