use aeroport_core::BookingService;

#[derive(Clone)]
pub struct AppState {
    pub service: BookingService,
}
