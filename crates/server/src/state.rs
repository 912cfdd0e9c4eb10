use tripscope::{repository::TripStore, viewport};

/// Icons handed to the map renderer for each kind of marker.
pub struct MarkerIcons {
    pub pickup: &'static str,
    pub dropoff: &'static str,
}

impl Default for MarkerIcons {
    fn default() -> Self {
        Self {
            pickup: "/assets/green_car.png",
            dropoff: "/assets/red_car.png",
        }
    }
}

pub struct AppState {
    pub store: TripStore,
    pub viewport: viewport::Config,
    pub icons: MarkerIcons,
}

impl AppState {
    pub fn new(store: TripStore) -> Self {
        Self {
            store,
            viewport: Default::default(),
            icons: Default::default(),
        }
    }
}
