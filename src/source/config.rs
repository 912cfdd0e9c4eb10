pub struct Config {
    /// Name of the trip table when the data ships inside a zip archive.
    pub trips_file_name: String,
    pub delimiter: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trips_file_name: "uber_dataset_con_distritos.csv".into(),
            delimiter: b',',
        }
    }
}
