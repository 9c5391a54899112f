pub mod test_leave_live_is_idempotent;
