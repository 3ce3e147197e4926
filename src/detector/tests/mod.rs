// Tests for the detector state machine



#[cfg(test)]
mod test_in_game;
