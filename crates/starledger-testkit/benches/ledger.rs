use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use starledger::Ledger;
use starledger_core::{Ed25519Verifier, ManualClock, Payload, SignatureVerifier, StarClaim};
use starledger_testkit::{multi_party_fixtures, sample_star, TestFixture, TestRegistry, FIXTURE_EPOCH};

fn claim_payload(fixture: &TestFixture) -> Payload {
    let address = fixture.identity();
    let message = format!("{address}:{FIXTURE_EPOCH}:starRegistry");
    Payload::StarClaim(StarClaim {
        signature: fixture.keypair.sign_message(&message),
        address,
        message,
        star: sample_star(),
    })
}

fn ledger_of(len: usize) -> Ledger {
    let ledger = Ledger::with_clock(Arc::new(ManualClock::new(FIXTURE_EPOCH))).expect("genesis");
    let parties = multi_party_fixtures(8);
    for i in 1..len {
        ledger
            .append(&claim_payload(&parties[i % parties.len()]))
            .expect("append");
    }
    ledger
}

fn bench_append(c: &mut Criterion) {
    let payload = claim_payload(&TestFixture::with_seed([1; 32]))
        .encode()
        .expect("encode");

    c.bench_function("ledger_append", |b| {
        b.iter_batched(
            || ledger_of(1),
            |ledger| ledger.append_bytes(payload.clone()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_validate");
    for len in [100usize, 1_000] {
        let ledger = ledger_of(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &ledger, |b, ledger| {
            b.iter(|| ledger.validate());
        });
    }
    group.finish();
}

fn bench_scan_claims(c: &mut Criterion) {
    let ledger = ledger_of(1_000);
    let identity = multi_party_fixtures(1)[0].identity();

    c.bench_function("ledger_scan_claims_1000", |b| {
        b.iter(|| ledger.scan_claims(&identity));
    });
}

fn bench_verify(c: &mut Criterion) {
    let fixture = TestFixture::with_seed([1; 32]);
    let identity = fixture.identity();
    let message = format!("{identity}:{FIXTURE_EPOCH}:starRegistry");
    let signature = fixture.keypair.sign_message(&message);

    c.bench_function("ed25519_verify_challenge", |b| {
        b.iter(|| Ed25519Verifier.verify(&message, &identity, &signature));
    });
}

fn bench_submit_claim(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let registry = runtime.block_on(TestRegistry::memory()).expect("registry");
    let fixture = TestFixture::with_seed([1; 32]);

    c.bench_function("registry_submit_claim", |b| {
        b.iter(|| {
            runtime
                .block_on(fixture.claim(&registry, sample_star()))
                .expect("claim")
        });
    });
}

criterion_group!(
    ledger_benches,
    bench_append,
    bench_validate,
    bench_scan_claims,
    bench_verify,
    bench_submit_claim
);
criterion_main!(ledger_benches);
