pub mod scripted_tracker;
