use pm_atom::testing::{fixture_environment, Conformance, PackageNames};
use pm_atom::{Atom, Environment, Error, Package, Pms};

pm_atom::conformance_suite!(pms, fixture_environment(Pms).unwrap());

fn env() -> Environment<Pms> {
    fixture_environment(Pms).unwrap()
}

#[test_log::test]
fn single_scenario() {
    let env = env();
    let atom = Atom::parse(&env, PackageNames::SINGLE).unwrap();
    assert!(!atom.is_complete());

    let matched: Vec<_> = env.select(&atom).collect();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].key().to_string(), PackageNames::SINGLE_COMPLETE);
    assert_eq!(
        atom.to_spec_string().unwrap_err(),
        Error::IncompleteAtom(PackageNames::SINGLE.to_string())
    );
}

#[test_log::test]
fn empty_scenario() {
    let env = env();
    let atom = Atom::parse(&env, PackageNames::EMPTY).unwrap();
    assert!(atom.is_complete());
    assert!(env.packages().iter().all(|pkg| !atom.matches(pkg)));
}

#[test_log::test]
fn subslotted_scenario() {
    let env = env();
    let atom = Atom::parse(&env, "a/subslotted:0/1").unwrap();
    assert_eq!(atom.slot().as_deref(), Some("0/1"));

    let slots: Vec<_> = env.select(&atom).map(|pkg| pkg.slot()).collect();
    assert_eq!(slots, ["0/1"]);
}

#[test_log::test]
fn use_dependency_scenario() {
    let env = env();
    let specifier = format!("{}[{}]", PackageNames::SINGLE_COMPLETE, PackageNames::SINGLE_USE);
    let atom = Atom::parse(&env, &specifier).unwrap();
    assert_eq!(atom.use_deps()[0].flag, PackageNames::SINGLE_USE);

    let ids: Vec<_> = env.select(&atom).map(|pkg| pkg.key().to_string()).collect();
    assert_eq!(ids, [PackageNames::SINGLE_COMPLETE]);
    assert_eq!(atom.to_spec_string().unwrap(), specifier);
}

#[test_log::test]
fn every_check_passes_for_pms() {
    let env = env();
    let failures = Conformance::new(&env).run();
    assert!(failures.is_empty(), "{failures:?}");
}

#[test_log::test]
fn failures_are_tagged_with_backend() {
    // without packages nothing can match, so the counting checks fail
    let env = Environment::new(Pms);
    let failures = Conformance::new(&env).run();
    assert!(!failures.is_empty());
    for failure in &failures {
        assert_eq!(failure.backend, "pms");
        assert!(failure.to_string().starts_with("[pms] "), "{failure}");
    }
    assert!(failures.iter().any(|f| f.check == "multiple"));
}
