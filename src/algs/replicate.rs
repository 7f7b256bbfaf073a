//! Run-parameter replication: one broadcast per table row.

use crate::algs::collective::{ROOT, broadcast};
use crate::algs::communicator::Communicator;
use crate::algs::wire::{WireCount, WireFlag};
use crate::data::run_parameters::{PATH_LEN, ParamRef, RunParameters};
use crate::gather_error::GatherError;

/// Copy the coordinator's `params` into `params` on every rank.
///
/// Must run exactly once, before anything derives a decomposition from the
/// parameters. On non-coordinator ranks every field is overwritten.
pub fn replicate_run_parameters<C>(comm: &C, params: &mut RunParameters) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    // every rank learns the coordinator's text verdict before any field moves
    let mut verdict = if comm.rank() == ROOT {
        check_text_fields(params)
    } else {
        [WireCount::default(); 3]
    };
    broadcast(comm, &mut verdict)?;
    if let Some(err) = text_error(&verdict) {
        return Err(err);
    }

    for field in RunParameters::fields() {
        broadcast_field(comm, (field.access)(params))?;
    }
    log::debug!(
        "rank {}: replicated {} run parameters",
        comm.rank(),
        RunParameters::fields().len()
    );
    Ok(())
}

const TEXT_OK: usize = 0;
const TEXT_TOO_LONG: usize = 1;
const TEXT_HAS_NUL: usize = 2;

/// `[status, field index, detail]` for the first text field that cannot
/// travel intact. Detail is the byte length or the NUL offset.
fn check_text_fields(params: &mut RunParameters) -> [WireCount; 3] {
    for (idx, field) in RunParameters::fields().iter().enumerate() {
        let ParamRef::Text(s) = (field.access)(params) else {
            continue;
        };
        if s.len() > PATH_LEN {
            return [TEXT_TOO_LONG, idx, s.len()].map(WireCount::new);
        }
        if let Some(offset) = s.bytes().position(|b| b == 0) {
            return [TEXT_HAS_NUL, idx, offset].map(WireCount::new);
        }
    }
    [TEXT_OK, 0, 0].map(WireCount::new)
}

fn text_error(verdict: &[WireCount; 3]) -> Option<GatherError> {
    let [status, idx, detail] = *verdict;
    let (status, idx, detail) = (status.get(), idx.get(), detail.get());
    let name = RunParameters::fields().get(idx).map_or("<unknown>", |f| f.name);
    match status {
        TEXT_OK => None,
        TEXT_TOO_LONG => Some(GatherError::ParameterTooLong {
            name,
            len: detail,
            capacity: PATH_LEN,
        }),
        _ => Some(GatherError::ParameterContainsNul {
            name,
            offset: detail,
        }),
    }
}

fn broadcast_field<C>(comm: &C, field: ParamRef<'_>) -> Result<(), GatherError>
where
    C: Communicator + ?Sized,
{
    match field {
        ParamRef::Int(v) => broadcast(comm, std::slice::from_mut(v)),
        ParamRef::Real(v) => broadcast(comm, std::slice::from_mut(v)),
        ParamRef::IntArray(v) => broadcast(comm, v),
        ParamRef::RealArray(v) => broadcast(comm, v),
        ParamRef::Bool(v) => {
            let mut wire = [WireFlag::of(*v)];
            broadcast(comm, &mut wire)?;
            *v = wire[0].get();
            Ok(())
        }
        ParamRef::BoolArray(v) => {
            let mut wire: Vec<WireFlag> = v.iter().map(|&b| WireFlag::of(b)).collect();
            broadcast(comm, &mut wire)?;
            for (dst, w) in v.iter_mut().zip(wire) {
                *dst = w.get();
            }
            Ok(())
        }
        ParamRef::Text(s) => {
            let mut wire = [0u8; PATH_LEN];
            if comm.rank() == ROOT {
                wire[..s.len()].copy_from_slice(s.as_bytes());
            }
            broadcast(comm, &mut wire)?;
            if comm.rank() != ROOT {
                let end = wire.iter().position(|&b| b == 0).unwrap_or(PATH_LEN);
                *s = String::from_utf8_lossy(&wire[..end]).into_owned();
            }
            Ok(())
        }
    }
}
