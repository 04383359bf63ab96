mod helpers;
mod sequential;
mod streaming;
mod two_phase;
