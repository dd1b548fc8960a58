mod mock_sms_tests;
