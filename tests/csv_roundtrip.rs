use std::fs;

use astro_panda::analysis::Operation;
use astro_panda::config::Config;
use astro_panda::data::loader;
use astro_panda::session::Session;
use tempfile::TempDir;

// Leading zeros, trailing zeros, blanks and quoted commas must survive a
// load → analyze → save cycle untouched.
const INPUT: &str = "\
galaxia,velocidad,distancia,z
\"Andromeda, M31\",-301.0,0.78,-0.001
M81,0250,3.60,
NGC 4258,448,7.6,0.0015
";

#[test]
fn original_columns_survive_analysis() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("galaxias.csv");
    let output = dir.path().join("resultado.csv");
    fs::write(&input, INPUT).unwrap();

    let mut session = Session::new(Config::default());
    session.load(&input).unwrap();
    let report = session.apply(&Operation::Analyze).unwrap();
    assert_eq!(report.skipped, 1);
    session.save(&output).unwrap();

    let mut original = csv::Reader::from_path(&input).unwrap();
    let mut written = csv::Reader::from_path(&output).unwrap();
    let headers = written.headers().unwrap().clone();
    assert!(headers.iter().take(4).eq(original.headers().unwrap().iter()));
    assert_eq!(headers.len(), 6);

    for (a, b) in original.records().zip(written.records()) {
        let (a, b) = (a.unwrap(), b.unwrap());
        for i in 0..a.len() {
            assert_eq!(&a[i], &b[i]);
        }
    }
}

#[test]
fn saved_output_loads_back_with_derived_values() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("galaxias.csv");
    let output = dir.path().join("resultado.csv");
    fs::write(&input, INPUT).unwrap();

    let mut session = Session::new(Config::default());
    session.load(&input).unwrap();
    session.apply(&Operation::Analyze).unwrap();
    session.save(&output).unwrap();

    let table = loader::load_file(&output).unwrap();
    assert_eq!(table.len(), 3);
    let h0 = table.column("H0_calculado").unwrap().f64_values();
    assert!((h0[2].unwrap() - 448.0 / 7.6).abs() < 1e-9);
    let d = table.column("distancia_Mpc_calculada").unwrap().f64_values();
    assert!(d[1].is_none());
    assert!((d[2].unwrap() - 299_792.458 * 0.0015 / 70.0).abs() < 1e-9);
}
