pub mod board_detector;
