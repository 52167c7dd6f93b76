//! End-to-end phase builds over mock lnPi containers.

use lnpi_phases::{BuildRequest, PhaseCreator, PhaseError, PhaseSet, ScanAxis};
use lnpi_segment::MergeConfig;
use lnpi_test_utils::fixtures::{mock_surface, three_wells_surface, TWO_WELLS};
use lnpi_test_utils::{assert_masks_partition, MockLnPi};
use ndarray::ArrayD;

fn two_wells_creator() -> PhaseCreator<MockLnPi> {
    PhaseCreator::builder()
        .nmax(2)
        .reference(MockLnPi::from_vec(TWO_WELLS.to_vec()))
        .merge(MergeConfig {
            merge_threshold: 0.5,
            ..Default::default()
        })
        .build()
        .unwrap()
}

fn two_phases() -> PhaseSet<MockLnPi> {
    let phases = two_wells_creator().build().unwrap();
    assert_eq!(phases.len(), 2);
    phases
}

#[test]
fn phases_partition_the_reference_domain() {
    let phases = two_phases();
    let domains: Vec<_> = phases.items().iter().map(MockLnPi::domain).collect();
    let all = ArrayD::from_elem(domains[0].raw_dim(), true);
    assert_masks_partition(&domains, &all);
}

#[test]
fn zero_lnz_keeps_both_wells() {
    let creator = two_wells_creator();
    let phases = creator
        .build_phases(&BuildRequest::new().lnz(&[0.0]))
        .unwrap();
    assert_eq!(phases.len(), 2);
    assert_eq!(phases.items()[0].lnz(), &[0.0]);
}

#[test]
fn steep_tilt_collapses_to_one_phase() {
    let creator = two_wells_creator();
    for lnz in [1.0, -1.0] {
        let phases = creator
            .build_phases(&BuildRequest::new().lnz(&[lnz]))
            .unwrap();
        assert_eq!(phases.len(), 1, "lnz = {lnz}");
        assert_eq!(phases.items()[0].domain_count(), 9);
        assert_eq!(phases.items()[0].lnz(), &[lnz]);
    }
}

#[test]
fn absolute_scan_reweights_the_free_slot() {
    let creator = two_wells_creator();
    let scan = creator.scan(ScanAxis::absolute(&[None]).unwrap());
    assert_eq!(scan.build(0.0).unwrap().len(), 2);
    let tilted = scan.build(1.0).unwrap();
    assert_eq!(tilted.len(), 1);
    assert_eq!(tilted.items()[0].lnz(), &[1.0]);
}

#[test]
fn relative_scan_applies_overrides() {
    let creator = two_wells_creator();
    let scan = creator.scan(ScanAxis::relative(&[None]).unwrap());
    assert_eq!(scan.axis().slot(), 0);
    let single = scan
        .build_with(0.0, &BuildRequest::new().nmax(1))
        .unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single.items()[0].domain_count(), 9);
}

#[test]
fn barrier_between_built_phases() {
    let phases = two_phases();
    let fe = phases.free_energy(None).unwrap();
    assert_eq!(fe.len(), 2);
    let from_left = phases.delta_w(0, None).unwrap();
    assert!((from_left - 1.0).abs() < 1e-12, "got {from_left}");
    let targeted = phases.delta_w(1, Some(&[0])).unwrap();
    assert!((targeted - 1.0).abs() < 1e-12, "got {targeted}");
}

#[test]
fn barrier_edge_cases() {
    let phases = two_phases();
    assert_eq!(phases.delta_w(9, None).unwrap(), 0.0);
    assert_eq!(phases.delta_w(0, Some(&[0])).unwrap(), f64::INFINITY);
    assert_eq!(phases.delta_w(0, Some(&[7])).unwrap(), f64::INFINITY);

    let single = PhaseSet::positional(vec![MockLnPi::from_vec(TWO_WELLS.to_vec())]);
    assert_eq!(single.delta_w(0, None).unwrap(), f64::INFINITY);
}

#[test]
fn empty_set_has_no_estimator() {
    let empty: PhaseSet<MockLnPi> = PhaseSet::positional(Vec::new());
    assert!(matches!(
        empty.free_energy(None),
        Err(PhaseError::Segment(_))
    ));
}

#[test]
fn surface_forced_to_two_phases() {
    let creator = PhaseCreator::builder()
        .nmax(2)
        .reference(mock_surface(24, 24, &three_wells_surface()))
        .build()
        .unwrap();
    let phases = creator.build().unwrap();
    assert_eq!(phases.len(), 2);
    let total: usize = phases.items().iter().map(MockLnPi::domain_count).sum();
    assert_eq!(total, 24 * 24);

    let wider = creator
        .build_phases(&BuildRequest::new().nmax(3))
        .unwrap();
    assert_eq!(wider.len(), 3);
}

#[test]
fn sub_threshold_references_build_empty_sets() {
    for values in [vec![1.0; 9], vec![0.0, 0.1, 0.0, 0.1, 0.0]] {
        let creator = PhaseCreator::builder()
            .nmax(2)
            .reference(MockLnPi::from_vec(values))
            .build()
            .unwrap();
        let phases = creator.scan(ScanAxis::absolute(&[None]).unwrap()).build(0.0).unwrap();
        assert!(phases.is_empty());
        assert_eq!(phases.delta_w(0, None).unwrap(), 0.0);
    }
}
