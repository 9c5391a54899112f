mod test_candidate_queueing;
mod test_initiator_rule;
