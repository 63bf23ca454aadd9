use std::fs;
use std::path::PathBuf;

use mmtd::join::{self, insights, MergeSpotifyTopPaths, MergeTweetsPaths, Table};

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn merge_tweets_then_report() {
    let dir = scratch_dir();
    fs::write(
        dir.join("tweets.csv"),
        "tweet_id,artist_name,track_name,tweet_count\n\
         1,Adele,Hello!,3\n\
         2,ADELE,hello,5\n\
         3,Drake,\"God's Plan\",1\n\
         4,Unknown,Song,2\n",
    )
    .unwrap();
    fs::write(
        dir.join("spotify.csv"),
        "artist_name,track_name,spotify_popularity\nadele,hello,80\nDrake,Gods Plan,90\n",
    )
    .unwrap();
    fs::write(dir.join("hot100.csv"), "artist_name,track_name,peak_rank\nAdele,Hello,1\n").unwrap();
    fs::write(dir.join("artists.csv"), "artist_name,listeners\nAdele,100\nDrake,200\n").unwrap();

    let paths = MergeTweetsPaths {
        tweets: dir.join("tweets.csv"),
        spotify: dir.join("spotify.csv"),
        hot100: dir.join("hot100.csv"),
        artists: dir.join("artists.csv"),
        output: dir.join("merged.csv"),
    };
    let shape = join::merge_tweets(&paths).unwrap();
    assert_eq!(shape, (4, 7));
    assert_eq!(
        fs::read_to_string(&paths.output).unwrap(),
        "tweet_id,artist_name,track_name,tweet_count,spotify_popularity,peak_rank,listeners\n\
         1,adele,hello,3,80,1,100\n\
         2,adele,hello,5,80,1,100\n\
         3,drake,gods plan,1,90,,200\n\
         4,unknown,song,2,,,\n"
    );

    let merged = Table::from_path(&paths.output, None).unwrap();
    let report = insights::report(&merged, 10, "tweet_count", "spotify_popularity").unwrap();
    assert_eq!(report.top_tracks[0].artist_name, "adele");
    assert_eq!(report.top_tracks[0].tweet_count, 2);
    assert_eq!(report.top_tracks.len(), 3);
    assert_eq!(report.correlation.rows_used, 3);
    assert!(report.correlation.pearson.is_some());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["top_tracks"][1]["track_name"], "gods plan");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn merge_spotify_top_reads_headerless_lists() {
    let dir = scratch_dir();
    fs::write(
        dir.join("spotify.csv"),
        "id,name,artists,popularity\n\
         s1,Hello,['Adele'],80\n\
         s2,Shallow,\"['Lady Gaga', 'Bradley Cooper']\",85\n",
    )
    .unwrap();
    fs::write(dir.join("songs.csv"), "Shallow,Lady Gaga,2018,5000\n").unwrap();
    fs::write(dir.join("artists.csv"), "Adele,100\nLady Gaga,300\n").unwrap();

    let paths = MergeSpotifyTopPaths {
        spotify: dir.join("spotify.csv"),
        top_songs: dir.join("songs.csv"),
        top_artists: dir.join("artists.csv"),
        output: dir.join("merged.csv"),
    };
    assert_eq!(join::merge_spotify_top(&paths).unwrap(), (2, 8));
    assert_eq!(
        fs::read_to_string(&paths.output).unwrap(),
        "id,name,artists,popularity,primary_artist,song_release_date,song_listens,artist_listeners\n\
         s1,Hello,['Adele'],80,Adele,,,100\n\
         s2,Shallow,\"['Lady Gaga', 'Bradley Cooper']\",85,Lady Gaga,2018,5000,300\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_input_names_the_file() {
    let dir = scratch_dir();
    let paths = MergeTweetsPaths {
        tweets: dir.join("absent.csv"),
        spotify: dir.join("absent.csv"),
        hot100: dir.join("absent.csv"),
        artists: dir.join("absent.csv"),
        output: dir.join("merged.csv"),
    };
    let err = join::merge_tweets(&paths).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
    assert!(!paths.output.exists());
    fs::remove_dir_all(&dir).unwrap();
}
