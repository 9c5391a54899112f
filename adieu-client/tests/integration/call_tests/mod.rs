mod test_leave_call;
