mod walker_tests;
