use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use cfd_gather::prelude::*;

// 1D field reassembly over four in-process ranks
fn bench_defragment_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("defragment_field");
    group.sample_size(20);

    for &cells in &[1_000usize, 100_000, 1_000_000] {
        let params = RunParameters {
            m: (cells - 1) as i32,
            ..RunParameters::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(cells), &params, |b, params| {
            b.iter(|| {
                RayonComm::run(4, |comm| {
                    let decomp = DomainDecomposition::from_run_parameters(
                        params,
                        ProcessTopology::of(comm),
                    )
                    .unwrap();
                    let ctx = GatherContext::initialize(comm, decomp).unwrap();
                    let local = vec![comm.rank() as f64; ctx.decomposition().local_cells()];
                    let mut global = if comm.rank() == ROOT {
                        vec![0.0; ctx.global_field_len()]
                    } else {
                        Vec::new()
                    };
                    ctx.defragment_field(&local, &mut global).unwrap();
                    ctx.finalize();
                    global.len()
                })
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_field_extents(c: &mut Criterion) {
    let params = RunParameters {
        m: 63,
        n: 63,
        p: 63,
        ..RunParameters::default()
    };
    c.bench_function("gather_data_extents/8_ranks", |b| {
        b.iter(|| {
            RayonComm::run(8, |comm| {
                let decomp =
                    DomainDecomposition::from_run_parameters(&params, ProcessTopology::of(comm))
                        .unwrap();
                let ctx = GatherContext::initialize(comm, decomp).unwrap();
                let field: Vec<f64> = (0..4096).map(|i| (i * (comm.rank() + 1)) as f64).collect();
                let mut table = ctx.new_field_table();
                ctx.gather_data_extents(&field, &mut table).unwrap();
                table.bounds()
            })
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_defragment_field, bench_field_extents);
criterion_main!(benches);
