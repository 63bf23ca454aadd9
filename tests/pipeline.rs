use std::fs;
use std::path::PathBuf;

use mmtd::standalone::{run_job, Job};
use mmtd::stream;

const RAW: &str = "\
101 202 303 404 2024-03-05 14:30:00
102 202 303 405 2024-03-06 09:00:00
bad line
103 9x 303 404 2024-03-05 14:30:00
104 203 306 404 2024-02-30 10:00:00
105 203 306 404 2024-03-10 23:59:59
";

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// clean | emit | sort | reduce, all in memory.
fn run_streaming(raw: &str) -> String {
    let mut cleaned = Vec::new();
    stream::run_clean(raw.as_bytes(), &mut cleaned).unwrap();

    let mut counts = Vec::new();
    stream::run_emit_counts(cleaned.as_slice(), &mut counts).unwrap();

    let counts = String::from_utf8(counts).unwrap();
    let mut lines: Vec<&str> = counts.lines().collect();
    lines.sort();
    let sorted = lines.join("\n") + "\n";

    let mut out = Vec::new();
    stream::reduce_sorted(sorted.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn streaming_stages_end_to_end() {
    assert_eq!(
        run_streaming(RAW),
        "ARTIST\t303\t2\n\
         ARTIST\t306\t1\n\
         STAT\tTOTAL_TWEETS\t3\n\
         TRACK\t404\t2\n\
         TRACK\t405\t1\n\
         USER\t202\t2\n\
         USER\t203\t1\n"
    );
}

#[test]
fn cleaned_lines_carry_weekday() {
    let mut cleaned = Vec::new();
    let kept = stream::run_clean(RAW.as_bytes(), &mut cleaned).unwrap();
    assert_eq!(kept, 3);
    let cleaned = String::from_utf8(cleaned).unwrap();
    // Tuesday, Wednesday, Sunday
    let weekdays: Vec<&str> = cleaned.lines().map(|l| l.rsplit('\t').next().unwrap()).collect();
    assert_eq!(weekdays, ["1", "2", "6"]);
}

#[test]
fn engine_matches_streaming_totals() {
    let dir = scratch_dir();
    fs::write(dir.join("part-1.txt"), RAW).unwrap();
    fs::write(dir.join("part-2.txt"), "106 202 303 404 2024-03-05 14:30:00\n").unwrap();

    let job = Job {
        input: dir.join("*.txt").to_string_lossy().into_owned(),
        workload: "tweet-profile".into(),
        output: dir.join("out").to_string_lossy().into_owned(),
        n_reduce: 3,
        args: vec![],
    };
    let outputs = run_job(&job).unwrap();
    assert!(!outputs.is_empty() && outputs.len() <= 3);

    let mut lines: Vec<String> = outputs
        .iter()
        .flat_map(|p| fs::read_to_string(p).unwrap().lines().map(str::to_string).collect::<Vec<_>>())
        .collect();
    lines.sort();

    let both = format!("{RAW}106 202 303 404 2024-03-05 14:30:00\n");
    let expected: Vec<String> = run_streaming(&both).lines().map(str::to_string).collect();
    assert_eq!(lines, expected);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn engine_audio_features_writes_header_and_years() {
    let dir = scratch_dir();
    let header = "valence,year,acousticness,artists,danceability,duration_ms,energy,explicit,id,instrumentalness,key,liveness,loudness,mode,name,popularity,release_date,speechiness,tempo";
    let row = |year: i32, valence: &str| {
        format!("{valence},{year},0.5,\"['A', 'B']\",0.5,200000,0.5,0,id,0.0,1,0.5,-10.0,1,T,50,{year},0.5,100.0")
    };
    let body = [header.to_string(), row(1999, "0.25"), row(1999, "0.75"), row(1950, "0.1"), row(2001, "1.0")].join("\n");
    fs::write(dir.join("spotify.csv"), body).unwrap();

    let job = Job {
        input: dir.join("spotify.csv").to_string_lossy().into_owned(),
        workload: "audio-features".into(),
        output: dir.join("out").to_string_lossy().into_owned(),
        n_reduce: 1,
        args: vec!["--to".into(), "2000".into()],
    };
    let outputs = run_job(&job).unwrap();
    assert_eq!(outputs, vec![dir.join("out").join("mr-out-0")]);

    let text = fs::read_to_string(&outputs[0]).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("year,avg_valence,"));
    assert_eq!(lines.next(), Some("1999,0.5,0.5,0.5,0.5,0.0,0.5,-10.0,0.5,100.0,2"));
    assert_eq!(lines.next(), None);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unknown_workload_is_an_error() {
    let job = Job {
        input: "*.nothing".into(),
        workload: "word-count".into(),
        output: "unused".into(),
        n_reduce: 1,
        args: vec![],
    };
    let err = run_job(&job).unwrap_err();
    assert!(err.to_string().contains("Known apps"));
}
