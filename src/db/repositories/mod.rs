mod burst_sessions;
