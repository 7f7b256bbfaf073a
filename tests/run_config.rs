//! Run parameters loaded from a JSON case file on the coordinator.

mod util;

use cfd_gather::prelude::*;

const CASE: &str = r#"{
    "case_dir": "2D_detonation",
    "m": 399,
    "n": 99,
    "format": 2,
    "cyl_coord": true,
    "buff_size": 2,
    "num_fluids": 2,
    "fluid_gamma": [1.4, 2.5, 0, 0, 0, 0, 0, 0, 0, 0],
    "vel_wrt": [true, true, false]
}"#;

#[test]
fn missing_keys_take_defaults() {
    let params: RunParameters = serde_json::from_str(CASE).unwrap();
    assert_eq!(params.case_dir, "2D_detonation");
    assert_eq!((params.m, params.n, params.p), (399, 99, 0));
    assert_eq!(params.output_format(), Ok(OutputFormat::Binary));
    assert_eq!(params.geometry(), GridGeometry::Cylindrical);
    assert_eq!(params.fluid_gamma[1], 2.5);
    assert_eq!(params.vel_wrt, [true, true, false]);
    assert_eq!(params.model_eqns, RunParameters::default().model_eqns);
    assert_eq!(params.t_step_save, 1);
}

#[test]
fn loaded_case_decomposes_over_ranks() {
    let params: RunParameters = serde_json::from_str(CASE).unwrap();
    let decomps = util::on_ranks(3, |comm| {
        let mut local = if comm.rank() == ROOT {
            params.clone()
        } else {
            RunParameters::default()
        };
        replicate_run_parameters(comm, &mut local).unwrap();
        util::decompose(comm, &local)
    });
    assert_eq!(
        decomps.iter().map(|d| d.local_cells()).collect::<Vec<_>>(),
        vec![134, 133, 133]
    );
    assert_eq!(
        decomps.iter().map(|d| d.start_idx).collect::<Vec<_>>(),
        vec![0, 134, 267]
    );
    for d in &decomps {
        assert_eq!(d.active_axes(), 2);
        assert_eq!(d.sys_size, 2 * 2 + 2 + 1);
        assert_eq!(d.axis_order(), AxisOrder::Native);
        assert!(!d.needs_gather_plan());
    }
}

#[test]
fn parameters_round_trip_through_json() {
    let params: RunParameters = serde_json::from_str(CASE).unwrap();
    let text = serde_json::to_string(&params).unwrap();
    let back: RunParameters = serde_json::from_str(&text).unwrap();
    assert_eq!(back, params);
}

#[test]
fn malformed_case_is_a_parse_error() {
    assert!(serde_json::from_str::<RunParameters>(r#"{"m": "many"}"#).is_err());
}
