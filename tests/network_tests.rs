//! Server / client round trips over loopback

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use agassi::model::{Coach, Player, Review, Score, Skills};
use agassi::network::{Client, Server};
use agassi::{AgassiError, Config, DataService, Result};
use tempfile::TempDir;

struct Running {
    temp: TempDir,
    server: Arc<Server>,
    handle: JoinHandle<Result<()>>,
    config: Config,
}

impl Running {
    fn client(&self) -> Client {
        let addr = self.server.local_addr().unwrap();
        let mut client = Client::connect(addr).unwrap();
        client.set_timeout(Some(Duration::from_secs(5))).unwrap();
        client
    }

    /// Stop the server, handing back the data directory and config
    fn stop(self) -> (TempDir, Config) {
        self.server.shutdown();
        self.handle.join().unwrap().unwrap();
        (self.temp, self.config)
    }
}

fn start_server() -> Running {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .site("test")
        .listen_addr("127.0.0.1:0")
        .open_timeout(Duration::from_secs(5))
        .build();

    let service = DataService::open(&config).unwrap();
    let server = Arc::new(Server::new(config.clone(), service));

    let runner = Arc::clone(&server);
    let handle = thread::spawn(move || runner.run());

    let deadline = Instant::now() + Duration::from_secs(5);
    while server.local_addr().is_none() {
        assert!(Instant::now() < deadline, "server did not start");
        thread::sleep(Duration::from_millis(5));
    }

    Running {
        temp,
        server,
        handle,
        config,
    }
}

#[test]
fn test_ping() {
    let running = start_server();
    running.client().ping().unwrap();
    running.stop();
}

#[test]
fn test_create_and_list_over_tcp() {
    let running = start_server();
    let mut client = running.client();

    assert!(client.list_players().unwrap().is_empty());
    assert!(client.list_coaches().unwrap().is_empty());

    assert_eq!(client.create_player(&Player::new("p1", "Ana")).unwrap(), "p1");
    assert_eq!(client.create_coach(&Coach::new("c1", "Bo")).unwrap(), "c1");

    assert_eq!(client.list_players().unwrap(), vec![Player::new("p1", "Ana")]);
    assert_eq!(client.list_coaches().unwrap(), vec![Coach::new("c1", "Bo")]);
    assert_eq!(client.get_player("p1").unwrap(), Some(Player::new("p1", "Ana")));
    assert_eq!(client.get_coach("zz").unwrap(), None);

    running.stop();
}

#[test]
fn test_duplicate_maps_to_conflict() {
    let running = start_server();
    let mut client = running.client();

    client.create_player(&Player::new("p1", "Ana")).unwrap();
    match client.create_player(&Player::new("p1", "Ana")) {
        Err(AgassiError::DuplicateKey { bucket, key }) => {
            assert_eq!(bucket, "players");
            assert_eq!(key, "p1");
        }
        other => panic!("Expected DuplicateKey, got {:?}", other),
    }

    // Connection stays usable after a rejected request
    assert_eq!(client.list_players().unwrap().len(), 1);
    running.stop();
}

#[test]
fn test_server_assigns_missing_id() {
    let running = start_server();
    let mut client = running.client();

    let id = client.create_coach(&Coach::new("", "Bo")).unwrap();
    assert!(!id.is_empty());
    assert_eq!(client.get_coach(&id).unwrap(), Some(Coach::new(id.clone(), "Bo")));

    running.stop();
}

#[test]
fn test_reviews_over_tcp() {
    let running = start_server();
    let mut client = running.client();

    let review = Review {
        author: Some(Coach::new("c1", "Bo")),
        skills: Some(Skills {
            total: Some(Score::new(9.0, "great")),
            ..Default::default()
        }),
    };

    assert!(matches!(
        client.add_review("p1", &review),
        Err(AgassiError::NotFound { .. })
    ));

    client.create_player(&Player::new("p1", "Ana")).unwrap();
    client.add_review("p1", &review).unwrap();
    assert_eq!(client.list_reviews("p1").unwrap(), vec![review]);

    running.stop();
}

#[test]
fn test_many_clients() {
    let running = start_server();
    let addr = running.server.local_addr().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                for i in 0..10 {
                    let id = format!("t{}_{}", t, i);
                    client.create_player(&Player::new(id, "x")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(running.client().list_players().unwrap().len(), 40);
    running.stop();
}

#[test]
fn test_shutdown_closes_store() {
    let running = start_server();
    running
        .client()
        .create_player(&Player::new("p1", "Ana"))
        .unwrap();

    let (_temp, config) = running.stop();

    // The file lock was released, so the site can be opened again at once
    let reopened = DataService::open(
        &Config::builder()
            .data_dir(&config.data_dir)
            .site(&config.site)
            .open_timeout(Duration::ZERO)
            .build(),
    )
    .unwrap();
    assert_eq!(reopened.list_players().unwrap(), vec![Player::new("p1", "Ana")]);
}

#[test]
fn test_run_twice_rejected() {
    let running = start_server();

    assert!(matches!(
        running.server.run(),
        Err(AgassiError::Network(_))
    ));

    running.stop();
}
