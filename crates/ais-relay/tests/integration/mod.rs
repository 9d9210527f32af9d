pub mod common {
    pub mod mock_feed;
}
