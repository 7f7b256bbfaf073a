//! Run configuration shared by every rank.
//!
//! [`RunParameters`] is read on the coordinator only; [`replicate_run_parameters`]
//! copies it everywhere before any decomposition metadata is derived. The
//! replication walks [`RUN_PARAMETER_FIELDS`], a table of
//! (name, kind, accessor) rows, so adding a parameter means adding one row.
//!
//! [`replicate_run_parameters`]: crate::algs::replicate::replicate_run_parameters

use crate::gather_error::GatherError;
use crate::topology::axis::GridGeometry;
use serde::{Deserialize, Serialize};

/// Capacity of per-fluid tables.
pub const NUM_FLUIDS_MAX: usize = 10;
/// Byte capacity of the case directory on the wire.
pub const PATH_LEN: usize = 400;

/// Output format selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Multidimensional visualization database (code 1).
    #[default]
    Silo,
    /// Raw binary (code 2).
    Binary,
}

impl TryFrom<i32> for OutputFormat {
    type Error = GatherError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OutputFormat::Silo),
            2 => Ok(OutputFormat::Binary),
            other => Err(GatherError::InvalidParameter {
                name: "format",
                value: other as i64,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    pub case_dir: String,

    // computational domain
    pub m: i32,
    pub n: i32,
    pub p: i32,
    pub cyl_coord: bool,
    pub t_step_start: i32,
    pub t_step_stop: i32,
    pub t_step_save: i32,
    pub buff_size: i32,

    // simulation algorithm
    pub model_eqns: i32,
    pub num_fluids: i32,
    pub weno_order: i32,
    pub mpp_lim: bool,
    pub mixture_err: bool,
    pub alt_soundspeed: bool,
    pub hypoelasticity: bool,
    pub bubbles: bool,
    pub polytropic: bool,
    pub bc_x: [i32; 2],
    pub bc_y: [i32; 2],
    pub bc_z: [i32; 2],

    // output selection
    pub format: i32,
    pub precision: i32,
    pub parallel_io: bool,
    pub file_per_process: bool,
    pub rho_wrt: bool,
    pub e_wrt: bool,
    pub pres_wrt: bool,
    pub gamma_wrt: bool,
    pub heat_ratio_wrt: bool,
    pub pi_inf_wrt: bool,
    pub pres_inf_wrt: bool,
    pub cons_vars_wrt: bool,
    pub prim_vars_wrt: bool,
    pub c_wrt: bool,
    pub qm_wrt: bool,
    pub schlieren_wrt: bool,
    pub mom_wrt: [bool; 3],
    pub vel_wrt: [bool; 3],
    pub flux_wrt: [bool; 3],
    pub omega_wrt: [bool; 3],
    pub alpha_rho_wrt: [bool; NUM_FLUIDS_MAX],
    pub alpha_wrt: [bool; NUM_FLUIDS_MAX],
    pub schlieren_alpha: [f64; NUM_FLUIDS_MAX],

    // fluid properties
    pub fluid_gamma: [f64; NUM_FLUIDS_MAX],
    pub fluid_pi_inf: [f64; NUM_FLUIDS_MAX],

    // reference scales
    pub pref: f64,
    pub rhoref: f64,
    pub r0ref: f64,
    pub poly_sigma: f64,
    pub weber: f64,
    pub cavitation: f64,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            case_dir: String::from("."),
            m: 0,
            n: 0,
            p: 0,
            cyl_coord: false,
            t_step_start: 0,
            t_step_stop: 0,
            t_step_save: 1,
            buff_size: 0,
            model_eqns: 2,
            num_fluids: 1,
            weno_order: 5,
            mpp_lim: false,
            mixture_err: false,
            alt_soundspeed: false,
            hypoelasticity: false,
            bubbles: false,
            polytropic: true,
            bc_x: [-1, -1],
            bc_y: [-1, -1],
            bc_z: [-1, -1],
            format: 1,
            precision: 2,
            parallel_io: false,
            file_per_process: false,
            rho_wrt: false,
            e_wrt: false,
            pres_wrt: false,
            gamma_wrt: false,
            heat_ratio_wrt: false,
            pi_inf_wrt: false,
            pres_inf_wrt: false,
            cons_vars_wrt: false,
            prim_vars_wrt: false,
            c_wrt: false,
            qm_wrt: false,
            schlieren_wrt: false,
            mom_wrt: [false; 3],
            vel_wrt: [false; 3],
            flux_wrt: [false; 3],
            omega_wrt: [false; 3],
            alpha_rho_wrt: [false; NUM_FLUIDS_MAX],
            alpha_wrt: [false; NUM_FLUIDS_MAX],
            schlieren_alpha: [0.0; NUM_FLUIDS_MAX],
            fluid_gamma: [0.0; NUM_FLUIDS_MAX],
            fluid_pi_inf: [0.0; NUM_FLUIDS_MAX],
            pref: 1.0,
            rhoref: 1.0,
            r0ref: 1.0,
            poly_sigma: 0.0,
            weber: 0.0,
            cavitation: 0.0,
        }
    }
}

impl RunParameters {
    pub fn output_format(&self) -> Result<OutputFormat, GatherError> {
        OutputFormat::try_from(self.format)
    }

    pub fn geometry(&self) -> GridGeometry {
        if self.cyl_coord {
            GridGeometry::Cylindrical
        } else {
            GridGeometry::Cartesian
        }
    }

    /// Number of active spatial axes implied by `n` and `p`.
    pub fn num_dims(&self) -> usize {
        1 + usize::from(self.n > 0) + usize::from(self.n > 0 && self.p > 0)
    }

    /// Number of conservative variables carried per cell.
    pub fn sys_size(&self) -> Result<usize, GatherError> {
        let fluids = usize::try_from(self.num_fluids)
            .ok()
            .filter(|f| (1..=NUM_FLUIDS_MAX).contains(f))
            .ok_or(GatherError::InvalidParameter {
                name: "num_fluids",
                value: self.num_fluids as i64,
            })?;
        let dims = self.num_dims();
        match self.model_eqns {
            // gamma/pi_inf model: density, momentum, energy, two advected properties
            1 => Ok(dims + 4),
            // five-equation model: partial densities, momentum, energy, volume fractions
            2 => Ok(2 * fluids + dims + 1),
            // six-equation model adds one internal energy per fluid
            3 => Ok(3 * fluids + dims + 1),
            // four-equation model
            4 => Ok(dims + 3),
            other => Err(GatherError::InvalidParameter {
                name: "model_eqns",
                value: other as i64,
            }),
        }
    }

    /// The replication table.
    pub fn fields() -> &'static [ParamField] {
        RUN_PARAMETER_FIELDS
    }
}

/// Primitive type tag of a replicated field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Bool,
    Real,
    IntArray,
    BoolArray,
    RealArray,
    /// Fixed-capacity text, [`PATH_LEN`] bytes on the wire.
    Text,
}

/// Mutable view of one field.
#[derive(Debug)]
pub enum ParamRef<'a> {
    Int(&'a mut i32),
    Bool(&'a mut bool),
    Real(&'a mut f64),
    IntArray(&'a mut [i32]),
    BoolArray(&'a mut [bool]),
    RealArray(&'a mut [f64]),
    Text(&'a mut String),
}

impl ParamRef<'_> {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamRef::Int(_) => ParamKind::Int,
            ParamRef::Bool(_) => ParamKind::Bool,
            ParamRef::Real(_) => ParamKind::Real,
            ParamRef::IntArray(_) => ParamKind::IntArray,
            ParamRef::BoolArray(_) => ParamKind::BoolArray,
            ParamRef::RealArray(_) => ParamKind::RealArray,
            ParamRef::Text(_) => ParamKind::Text,
        }
    }
}

/// One row of the replication table.
#[derive(Copy, Clone)]
pub struct ParamField {
    pub name: &'static str,
    pub kind: ParamKind,
    pub access: fn(&mut RunParameters) -> ParamRef<'_>,
}

impl std::fmt::Debug for ParamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

use ParamKind as K;
use ParamRef as R;

pub static RUN_PARAMETER_FIELDS: &[ParamField] = &[
    ParamField { name: "case_dir", kind: K::Text, access: |p| R::Text(&mut p.case_dir) },
    ParamField { name: "m", kind: K::Int, access: |p| R::Int(&mut p.m) },
    ParamField { name: "n", kind: K::Int, access: |p| R::Int(&mut p.n) },
    ParamField { name: "p", kind: K::Int, access: |p| R::Int(&mut p.p) },
    ParamField { name: "cyl_coord", kind: K::Bool, access: |p| R::Bool(&mut p.cyl_coord) },
    ParamField { name: "t_step_start", kind: K::Int, access: |p| R::Int(&mut p.t_step_start) },
    ParamField { name: "t_step_stop", kind: K::Int, access: |p| R::Int(&mut p.t_step_stop) },
    ParamField { name: "t_step_save", kind: K::Int, access: |p| R::Int(&mut p.t_step_save) },
    ParamField { name: "buff_size", kind: K::Int, access: |p| R::Int(&mut p.buff_size) },
    ParamField { name: "model_eqns", kind: K::Int, access: |p| R::Int(&mut p.model_eqns) },
    ParamField { name: "num_fluids", kind: K::Int, access: |p| R::Int(&mut p.num_fluids) },
    ParamField { name: "weno_order", kind: K::Int, access: |p| R::Int(&mut p.weno_order) },
    ParamField { name: "mpp_lim", kind: K::Bool, access: |p| R::Bool(&mut p.mpp_lim) },
    ParamField { name: "mixture_err", kind: K::Bool, access: |p| R::Bool(&mut p.mixture_err) },
    ParamField { name: "alt_soundspeed", kind: K::Bool, access: |p| R::Bool(&mut p.alt_soundspeed) },
    ParamField { name: "hypoelasticity", kind: K::Bool, access: |p| R::Bool(&mut p.hypoelasticity) },
    ParamField { name: "bubbles", kind: K::Bool, access: |p| R::Bool(&mut p.bubbles) },
    ParamField { name: "polytropic", kind: K::Bool, access: |p| R::Bool(&mut p.polytropic) },
    ParamField { name: "bc_x", kind: K::IntArray, access: |p| R::IntArray(&mut p.bc_x) },
    ParamField { name: "bc_y", kind: K::IntArray, access: |p| R::IntArray(&mut p.bc_y) },
    ParamField { name: "bc_z", kind: K::IntArray, access: |p| R::IntArray(&mut p.bc_z) },
    ParamField { name: "format", kind: K::Int, access: |p| R::Int(&mut p.format) },
    ParamField { name: "precision", kind: K::Int, access: |p| R::Int(&mut p.precision) },
    ParamField { name: "parallel_io", kind: K::Bool, access: |p| R::Bool(&mut p.parallel_io) },
    ParamField { name: "file_per_process", kind: K::Bool, access: |p| R::Bool(&mut p.file_per_process) },
    ParamField { name: "rho_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.rho_wrt) },
    ParamField { name: "E_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.e_wrt) },
    ParamField { name: "pres_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.pres_wrt) },
    ParamField { name: "gamma_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.gamma_wrt) },
    ParamField { name: "heat_ratio_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.heat_ratio_wrt) },
    ParamField { name: "pi_inf_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.pi_inf_wrt) },
    ParamField { name: "pres_inf_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.pres_inf_wrt) },
    ParamField { name: "cons_vars_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.cons_vars_wrt) },
    ParamField { name: "prim_vars_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.prim_vars_wrt) },
    ParamField { name: "c_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.c_wrt) },
    ParamField { name: "qm_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.qm_wrt) },
    ParamField { name: "schlieren_wrt", kind: K::Bool, access: |p| R::Bool(&mut p.schlieren_wrt) },
    ParamField { name: "mom_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.mom_wrt) },
    ParamField { name: "vel_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.vel_wrt) },
    ParamField { name: "flux_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.flux_wrt) },
    ParamField { name: "omega_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.omega_wrt) },
    ParamField { name: "alpha_rho_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.alpha_rho_wrt) },
    ParamField { name: "alpha_wrt", kind: K::BoolArray, access: |p| R::BoolArray(&mut p.alpha_wrt) },
    ParamField { name: "schlieren_alpha", kind: K::RealArray, access: |p| R::RealArray(&mut p.schlieren_alpha) },
    ParamField { name: "fluid_pp%gamma", kind: K::RealArray, access: |p| R::RealArray(&mut p.fluid_gamma) },
    ParamField { name: "fluid_pp%pi_inf", kind: K::RealArray, access: |p| R::RealArray(&mut p.fluid_pi_inf) },
    ParamField { name: "pref", kind: K::Real, access: |p| R::Real(&mut p.pref) },
    ParamField { name: "rhoref", kind: K::Real, access: |p| R::Real(&mut p.rhoref) },
    ParamField { name: "R0ref", kind: K::Real, access: |p| R::Real(&mut p.r0ref) },
    ParamField { name: "poly_sigma", kind: K::Real, access: |p| R::Real(&mut p.poly_sigma) },
    ParamField { name: "Web", kind: K::Real, access: |p| R::Real(&mut p.weber) },
    ParamField { name: "Ca", kind: K::Real, access: |p| R::Real(&mut p.cavitation) },
];
